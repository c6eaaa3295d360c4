//! Audit log errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("storage error")]
    Sql(#[from] sqlx::Error),

    #[error("stored audit entry has an unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
}
