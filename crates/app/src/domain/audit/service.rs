//! Audit log service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;

use crate::domain::audit::{
    data::{ActivityFilter, NewAuditEntry},
    errors::AuditLogError,
    records::AuditLogRecord,
    repository::PgAuditLogsRepository,
};

#[derive(Debug, Clone)]
pub struct PgAuditLogService {
    repository: PgAuditLogsRepository,
}

impl PgAuditLogService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAuditLogsRepository::new(pool),
        }
    }
}

#[async_trait]
impl AuditLogService for PgAuditLogService {
    async fn record(&self, entry: NewAuditEntry) -> Result<AuditLogRecord, AuditLogError> {
        Ok(self.repository.insert_entry(entry).await?)
    }

    async fn list_activity(
        &self,
        filter: ActivityFilter,
    ) -> Result<Vec<AuditLogRecord>, AuditLogError> {
        Ok(self.repository.list_activity(&filter).await?)
    }
}

#[automock]
#[async_trait]
pub trait AuditLogService: Send + Sync {
    /// Append an entry to the audit log.
    async fn record(&self, entry: NewAuditEntry) -> Result<AuditLogRecord, AuditLogError>;

    /// Newest entries first, narrowed by `filter`.
    async fn list_activity(
        &self,
        filter: ActivityFilter,
    ) -> Result<Vec<AuditLogRecord>, AuditLogError>;
}

/// Record an entry for an action that has already committed, or for a
/// rejected request. A failed write is logged and dropped so it never undoes
/// or fails the action itself.
pub async fn record_after_commit(audit: &dyn AuditLogService, entry: NewAuditEntry) {
    let action = entry.action;
    let target = entry.target.uuid;

    if let Err(error) = audit.record(entry).await {
        tracing::warn!(
            action = action.as_str(),
            target = ?target,
            error = %error,
            "failed to write audit log entry"
        );
    }
}
