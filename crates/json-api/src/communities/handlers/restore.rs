//! Restore Community Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use townhall_app::{auth::permissions::permission, domain::backups::BackupUuid};

use crate::{
    communities::{
        errors::from_deletion_error,
        responses::{CommunitySummary, KindCounts, kind_counts},
    },
    errors::ApiError,
    extensions::*,
    observability::observe_lifecycle,
    state::State,
};

/// Community Restored Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CommunityRestoredResponse {
    pub success: bool,
    pub message: String,

    /// The re-created community. Its id differs from the deleted one.
    pub community: CommunitySummary,
    pub restored: KindCounts,
}

/// Restore Community Handler
///
/// The path segment is the id of the backup, not of the deleted community.
#[endpoint(
    tags("communities"),
    summary = "Restore Community",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    backup: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CommunityRestoredResponse>, ApiError> {
    let admin = depot.authorize(permission::DELETE_CRITICAL)?;
    let actor = req.actor(admin);
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let restored = match state
        .app
        .deletions
        .restore_community(actor, BackupUuid::from_uuid(backup.into_inner()))
        .await
    {
        Ok(restored) => {
            observe_lifecycle("restore", "success");
            restored
        }
        Err(error) => {
            observe_lifecycle("restore", "failure");
            return Err(from_deletion_error(error, "Failed to restore community"));
        }
    };

    Ok(Json(CommunityRestoredResponse {
        success: true,
        message: "Community restored successfully".to_string(),
        restored: kind_counts(&restored.restored),
        community: restored.community.into(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use townhall_app::{
        auth::Role,
        domain::{
            backups::RestoreBlocked,
            communities::records::CommunityUuid,
            deletion::{DeletionServiceError, data::RestoredCommunity},
        },
    };

    use crate::{
        errors::ErrorBody,
        test_helpers::{Mocks, example_counts, make_community, service_as},
    };

    use super::*;

    fn make_service(role: Role, mocks: Mocks) -> Service {
        service_as(
            role,
            mocks,
            Router::with_path("communities/{backup}/restore").post(handler),
        )
    }

    #[tokio::test]
    async fn test_restore_returns_new_community() -> TestResult {
        let backup = BackupUuid::new();
        let community = CommunityUuid::new();

        let mut mocks = Mocks::default();

        mocks
            .deletions
            .expect_restore_community()
            .once()
            .withf(move |_, b| *b == backup)
            .return_once(move |_, _| {
                Ok(RestoredCommunity {
                    community: make_community(community),
                    backup,
                    restored: example_counts(),
                })
            });

        let mut res = TestClient::post(format!("http://example.com/communities/{backup}/restore"))
            .send(&make_service(Role::SuperAdmin, mocks))
            .await;

        let body: CommunityRestoredResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.message, "Community restored successfully");
        assert_eq!(body.community.id, community.into_uuid());
        assert_eq!(body.restored.get("payments"), Some(&1));

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_twice_returns_400_with_reason() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .deletions
            .expect_restore_community()
            .once()
            .return_once(|_, _| Err(RestoreBlocked::AlreadyRestored.into()));

        let mut res = TestClient::post(format!(
            "http://example.com/communities/{}/restore",
            Uuid::now_v7()
        ))
        .send(&make_service(Role::SuperAdmin, mocks))
        .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.message, "Community already restored");

        Ok(())
    }

    #[tokio::test]
    async fn test_restore_unknown_backup_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .deletions
            .expect_restore_community()
            .once()
            .return_once(|_, _| Err(DeletionServiceError::BackupNotFound));

        let mut res = TestClient::post(format!(
            "http://example.com/communities/{}/restore",
            Uuid::now_v7()
        ))
        .send(&make_service(Role::SuperAdmin, mocks))
        .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
        assert_eq!(body.message, "Backup not found");

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_cannot_restore() -> TestResult {
        let mut res = TestClient::post(format!(
            "http://example.com/communities/{}/restore",
            Uuid::now_v7()
        ))
        .send(&make_service(Role::Admin, Mocks::default()))
        .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
        assert_eq!(body.required.as_deref(), Some("delete:critical"));
        assert_eq!(body.user_role.as_deref(), Some("admin"));

        Ok(())
    }
}
