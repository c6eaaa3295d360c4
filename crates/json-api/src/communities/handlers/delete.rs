//! Delete Community Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use townhall_app::{auth::permissions::permission, domain::communities::records::CommunityUuid};

use crate::{
    communities::{
        errors::from_deletion_error,
        responses::{KindCounts, kind_counts},
    },
    errors::ApiError,
    extensions::*,
    observability::observe_lifecycle,
    state::State,
};

/// Delete Community Request. The body may be omitted entirely.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeleteCommunityRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackupReference {
    pub id: Uuid,
    pub can_restore_until: String,
}

/// Community Deleted Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CommunityDeletedResponse {
    pub success: bool,
    pub message: String,
    pub deleted: KindCounts,
    pub backup: BackupReference,
}

async fn read_request(req: &mut Request) -> Result<DeleteCommunityRequest, ApiError> {
    let payload = req.payload().await.or_400("Invalid request body")?;

    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(DeleteCommunityRequest::default());
    }

    serde_json::from_slice(payload).or_400("Invalid request body")
}

/// Delete Community Handler
///
/// Backs up the community with everything it owns, then removes it. The
/// backup can be restored until `canRestoreUntil`.
#[endpoint(
    tags("communities"),
    summary = "Delete Community",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    community: PathParam<Uuid>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<CommunityDeletedResponse>, ApiError> {
    let admin = depot.authorize(permission::DELETE_CRITICAL)?;
    let actor = req.actor(admin);
    let request = read_request(req).await?;
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let deleted = match state
        .app
        .deletions
        .delete_community(
            actor,
            CommunityUuid::from_uuid(community.into_inner()),
            request.reason,
        )
        .await
    {
        Ok(deleted) => {
            observe_lifecycle("delete", "success");
            deleted
        }
        Err(error) => {
            observe_lifecycle("delete", "failure");
            return Err(from_deletion_error(error, "Failed to delete community"));
        }
    };

    Ok(Json(CommunityDeletedResponse {
        success: true,
        message: "Community deleted successfully. Can be restored within 30 days.".to_string(),
        deleted: kind_counts(&deleted.deleted),
        backup: BackupReference {
            id: deleted.backup.into_uuid(),
            can_restore_until: deleted.can_restore_until.to_string(),
        },
    }))
}
