//! Get Community Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use townhall_app::{auth::permissions::permission, domain::communities::records::CommunityUuid};

use crate::{
    communities::{errors::from_communities_error, responses::CommunityResponse},
    errors::ApiError,
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CommunityEnvelope {
    pub success: bool,
    pub community: CommunityResponse,
}

/// Get Community Handler
#[endpoint(
    tags("communities"),
    summary = "Get Community",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    community: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CommunityEnvelope>, ApiError> {
    depot.authorize(permission::READ_COMMUNITIES)?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    let community = state
        .app
        .communities
        .get_community(CommunityUuid::from_uuid(community.into_inner()))
        .await
        .map_err(|error| from_communities_error(error, "Failed to get community"))?;

    Ok(Json(CommunityEnvelope {
        success: true,
        community: community.into(),
    }))
}
