//! Get Backup Handler

use std::{string::ToString, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use townhall_app::{
    auth::{AdminUuid, permissions::permission},
    domain::backups::{BackupRecord, BackupUuid},
};

use crate::{
    communities::{
        from_deletion_error,
        responses::{KindCounts, kind_counts},
    },
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Backup metadata. Snapshot documents are never exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackupResponse {
    pub id: Uuid,
    pub original_community_id: Uuid,
    pub community_name: String,
    pub status: String,
    pub deleted_by: Uuid,
    pub deleted_by_email: String,
    pub deleted_at: String,
    pub reason: String,
    pub counts: KindCounts,
    pub can_restore_until: String,
    pub restored_at: Option<String>,
    pub restored_by: Option<Uuid>,
}

impl From<BackupRecord> for BackupResponse {
    fn from(backup: BackupRecord) -> Self {
        Self {
            id: backup.uuid.into_uuid(),
            original_community_id: backup.original_community_uuid.into_uuid(),
            community_name: backup.snapshot.community.name,
            status: backup.status.to_string(),
            deleted_by: backup.deletion.deleted_by.into_uuid(),
            deleted_by_email: backup.deletion.deleted_by_email,
            deleted_at: backup.deletion.deleted_at.to_string(),
            reason: backup.deletion.reason,
            counts: kind_counts(&backup.deletion.counts),
            can_restore_until: backup.permanent_delete_at.to_string(),
            restored_at: backup.restored_at.as_ref().map(ToString::to_string),
            restored_by: backup.restored_by.map(AdminUuid::into_uuid),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BackupEnvelope {
    pub success: bool,
    pub backup: BackupResponse,
}

/// Get Backup Handler
#[endpoint(
    tags("backups"),
    summary = "Get Backup",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    backup: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BackupEnvelope>, ApiError> {
    depot.authorize(permission::DELETE_CRITICAL)?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    let backup = state
        .app
        .deletions
        .get_backup(BackupUuid::from_uuid(backup.into_inner()))
        .await
        .map_err(|error| from_deletion_error(error, "Failed to get backup"))?;

    Ok(Json(BackupEnvelope {
        success: true,
        backup: backup.into(),
    }))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use townhall_app::{
        auth::Role,
        domain::{
            backups::{
                BackupStatus,
                data::{CommunitySnapshot, DeletionMetadata, RETENTION},
            },
            communities::records::CommunityUuid,
            deletion::DeletionServiceError,
        },
    };

    use crate::test_helpers::{Mocks, TEST_ADMIN_UUID, example_counts, make_community, service_as};

    use super::*;

    fn make_service(role: Role, mocks: Mocks) -> Service {
        service_as(role, mocks, Router::with_path("backups/{backup}").get(handler))
    }

    fn make_backup(uuid: BackupUuid) -> BackupRecord {
        let community = make_community(CommunityUuid::new());
        let deleted_at = Timestamp::UNIX_EPOCH;

        BackupRecord {
            uuid,
            original_community_uuid: community.uuid,
            snapshot: CommunitySnapshot::new(community),
            deletion: DeletionMetadata {
                deleted_by: TEST_ADMIN_UUID,
                deleted_by_email: "super-admin@townhall.test".to_string(),
                deleted_at,
                reason: "duplicate".to_string(),
                counts: example_counts(),
            },
            permanent_delete_at: deleted_at + RETENTION,
            status: BackupStatus::Pending,
            restored_at: None,
            restored_by: None,
            created_at: deleted_at,
            updated_at: deleted_at,
        }
    }

    #[tokio::test]
    async fn test_get_backup_returns_metadata() -> TestResult {
        let uuid = BackupUuid::new();
        let backup = make_backup(uuid);

        let mut mocks = Mocks::default();

        mocks
            .deletions
            .expect_get_backup()
            .once()
            .withf(move |b| *b == uuid)
            .return_once(move |_| Ok(backup));

        let mut res = TestClient::get(format!("http://example.com/backups/{uuid}"))
            .send(&make_service(Role::SuperAdmin, mocks))
            .await;

        let body: BackupEnvelope = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.backup.id, uuid.into_uuid());
        assert_eq!(body.backup.status, "pending");
        assert_eq!(body.backup.community_name, "Maple Court");
        assert_eq!(body.backup.reason, "duplicate");
        assert_eq!(body.backup.counts.get("workers"), Some(&1));
        assert_eq!(body.backup.restored_at, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_backup_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .deletions
            .expect_get_backup()
            .once()
            .return_once(|_| Err(DeletionServiceError::BackupNotFound));

        let res = TestClient::get(format!("http://example.com/backups/{}", Uuid::now_v7()))
            .send(&make_service(Role::SuperAdmin, mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_support_cannot_read_backups() -> TestResult {
        let res = TestClient::get(format!("http://example.com/backups/{}", Uuid::now_v7()))
            .send(&make_service(Role::Support, Mocks::default()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
