//! Delete Preview Handler

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
        responses::{CommunitySummary, KindCounts, kind_counts},
    },
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Delete Preview Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeletePreviewResponse {
    pub success: bool,
    pub community: CommunitySummary,

    /// Records a delete would remove right now, per kind.
    pub will_delete: KindCounts,
}

/// Delete Preview Handler
///
/// Counts what deleting the community would remove, without changing anything.
#[endpoint(
    tags("communities"),
    summary = "Preview Community Deletion",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    community: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<DeletePreviewResponse>, ApiError> {
    depot.authorize(permission::DELETE_CRITICAL)?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    let preview = state
        .app
        .deletions
        .delete_preview(CommunityUuid::from_uuid(community.into_inner()))
        .await
        .map_err(|error| from_deletion_error(error, "Failed to get delete preview"))?;

    Ok(Json(DeletePreviewResponse {
        success: true,
        will_delete: kind_counts(&preview.counts),
        community: preview.community.into(),
    }))
}
