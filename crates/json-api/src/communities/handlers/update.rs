//! Update Community Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use townhall_app::{
    auth::permissions::permission,
    domain::communities::{data::CommunityUpdate, records::CommunityUuid},
};

use crate::{
    communities::{
        errors::from_communities_error,
        handlers::create::{LayoutRequest, parse_status, parse_timestamp},
        responses::CommunityResponse,
    },
    errors::ApiError,
    extensions::*,
    state::State,
};

/// Update Community Request. Omitted fields are left as they are.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateCommunityRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub subscription_plan: Option<String>,
    pub subscription_status: Option<String>,

    /// RFC 3339 timestamp.
    pub plan_starts_at: Option<String>,

    /// RFC 3339 timestamp.
    pub plan_ends_at: Option<String>,

    pub layout: Option<LayoutRequest>,
    pub total_members: Option<u64>,
}

impl TryFrom<UpdateCommunityRequest> for CommunityUpdate {
    type Error = ApiError;

    fn try_from(request: UpdateCommunityRequest) -> Result<Self, Self::Error> {
        Ok(CommunityUpdate {
            name: request.name,
            location: request.location,
            subscription_plan: request.subscription_plan,
            subscription_status: parse_status(request.subscription_status)?,
            plan_starts_at: parse_timestamp(request.plan_starts_at, "planStartsAt")?,
            plan_ends_at: parse_timestamp(request.plan_ends_at, "planEndsAt")?,
            layout: request.layout.map(Into::into),
            total_members: request.total_members,
        })
    }
}

/// Community Updated Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CommunityUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub community: CommunityResponse,
}

/// Update Community Handler
#[endpoint(
    tags("communities"),
    summary = "Update Community",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    community: PathParam<Uuid>,
    req: &mut Request,
    json: JsonBody<UpdateCommunityRequest>,
    depot: &mut Depot,
) -> Result<Json<CommunityUpdatedResponse>, ApiError> {
    let admin = depot.authorize(permission::WRITE_COMMUNITIES)?;
    let actor = req.actor(admin);
    let update = json.into_inner().try_into()?;
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let community = state
        .app
        .communities
        .update_community(
            actor,
            CommunityUuid::from_uuid(community.into_inner()),
            update,
        )
        .await
        .map_err(|error| from_communities_error(error, "Failed to update community"))?;

    Ok(Json(CommunityUpdatedResponse {
        success: true,
        message: "Community updated successfully".to_string(),
        community: community.into(),
    }))
}
