//! Community Errors

use tracing::error;

use townhall_app::domain::{communities::CommunitiesServiceError, deletion::DeletionServiceError};

use crate::errors::ApiError;

pub(crate) fn from_communities_error(
    error: CommunitiesServiceError,
    failure: &'static str,
) -> ApiError {
    match error {
        CommunitiesServiceError::NotFound => ApiError::not_found("Community not found"),
        CommunitiesServiceError::AlreadyExists => {
            ApiError::conflict("Community already exists")
        }
        CommunitiesServiceError::Validation(reason) => ApiError::bad_request(reason),
        CommunitiesServiceError::MissingRequiredData
        | CommunitiesServiceError::InvalidData
        | CommunitiesServiceError::InvalidMemberCount(_) => {
            ApiError::bad_request("Invalid community payload")
        }
        CommunitiesServiceError::Sql(source) => {
            error!("{failure}: {source}");

            ApiError::internal(failure)
        }
    }
}

pub(crate) fn from_deletion_error(error: DeletionServiceError, failure: &'static str) -> ApiError {
    match error {
        DeletionServiceError::CommunityNotFound => ApiError::not_found("Community not found"),
        DeletionServiceError::BackupNotFound => ApiError::not_found("Backup not found"),
        DeletionServiceError::RestoreBlocked(blocked) => ApiError::bad_request(blocked.to_string()),
        DeletionServiceError::RestoreConflict { .. } => {
            ApiError::conflict(failure).with_error(error.to_string())
        }
        DeletionServiceError::InvalidData => ApiError::bad_request("Invalid stored data"),
        DeletionServiceError::CascadeFailed { kind, ref source } => {
            error!(kind = kind.as_str(), "{failure}: {source}");

            ApiError::internal(failure).with_error(error.to_string())
        }
        DeletionServiceError::Sql(source) => {
            error!("{failure}: {source}");

            ApiError::internal(failure)
        }
    }
}
