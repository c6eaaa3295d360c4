//! Deletion service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{backups::RestoreBlocked, dependents::DependentKind};

#[derive(Debug, Error)]
pub enum DeletionServiceError {
    #[error("community not found")]
    CommunityNotFound,

    #[error("backup not found")]
    BackupNotFound,

    #[error(transparent)]
    RestoreBlocked(#[from] RestoreBlocked),

    /// Removing one kind of dependent failed. The transaction was rolled
    /// back, so no backup was kept and nothing was deleted.
    #[error("failed to delete {kind}")]
    CascadeFailed {
        kind: DependentKind,
        #[source]
        source: Error,
    },

    /// A restored record collides with one that already exists.
    #[error("restored {kind} conflict with existing records")]
    RestoreConflict { kind: DependentKind },

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for DeletionServiceError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl DeletionServiceError {
    /// Classify a failure while inserting restored `kind` records.
    pub(crate) fn restoring(kind: DependentKind, error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::RestoreConflict { kind },
            _ => error.into(),
        }
    }
}
