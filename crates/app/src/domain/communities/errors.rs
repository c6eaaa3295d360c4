//! Communities service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommunitiesServiceError {
    #[error("community already exists")]
    AlreadyExists,

    #[error("community not found")]
    NotFound,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("{0}")]
    Validation(&'static str),

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid member count")]
    InvalidMemberCount(#[from] TryFromIntError),
}

impl From<Error> for CommunitiesServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let error = CommunitiesServiceError::from(Error::RowNotFound);

        assert!(matches!(error, CommunitiesServiceError::NotFound));
    }

    #[test]
    fn other_errors_are_storage_errors() {
        let error = CommunitiesServiceError::from(Error::PoolTimedOut);

        assert!(matches!(error, CommunitiesServiceError::Sql(_)));
    }
}
