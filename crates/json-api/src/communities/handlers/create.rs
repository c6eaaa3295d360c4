//! Create Community Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use townhall_app::{
    auth::permissions::permission,
    domain::communities::{
        data::NewCommunity,
        records::{BlockLayout, CommunityLayout, SubscriptionStatus},
    },
};

use crate::{
    communities::{errors::from_communities_error, responses::CommunityResponse},
    errors::ApiError,
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlockRequest {
    pub name: String,
    pub floors: u32,
    pub units_per_floor: u32,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct LayoutRequest {
    #[serde(default)]
    pub blocks: Vec<BlockRequest>,
}

/// Create Community Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCommunityRequest {
    pub name: String,
    pub location: String,
    pub subscription_plan: Option<String>,

    /// `pending` when omitted.
    pub subscription_status: Option<String>,

    /// RFC 3339 timestamp.
    pub plan_starts_at: Option<String>,

    /// RFC 3339 timestamp.
    pub plan_ends_at: Option<String>,

    #[serde(default)]
    pub layout: LayoutRequest,

    #[serde(default)]
    pub total_members: u64,
}

impl From<LayoutRequest> for CommunityLayout {
    fn from(layout: LayoutRequest) -> Self {
        Self {
            blocks: layout
                .blocks
                .into_iter()
                .map(|block| BlockLayout {
                    name: block.name,
                    floors: block.floors,
                    units_per_floor: block.units_per_floor,
                })
                .collect(),
        }
    }
}

pub(crate) fn parse_timestamp(
    value: Option<String>,
    field: &str,
) -> Result<Option<Timestamp>, ApiError> {
    value
        .map(|raw| {
            raw.parse::<Timestamp>().map_err(|_ignored| {
                ApiError::bad_request(format!("{field} is not a valid timestamp"))
            })
        })
        .transpose()
}

pub(crate) fn parse_status(status: Option<String>) -> Result<Option<SubscriptionStatus>, ApiError> {
    status
        .map(|status| status.parse::<SubscriptionStatus>())
        .transpose()
        .or_400("Unknown subscription status")
}

impl TryFrom<CreateCommunityRequest> for NewCommunity {
    type Error = ApiError;

    fn try_from(request: CreateCommunityRequest) -> Result<Self, Self::Error> {
        let subscription_status = parse_status(request.subscription_status)?.unwrap_or_default();

        Ok(NewCommunity {
            name: request.name,
            location: request.location,
            subscription_plan: request.subscription_plan,
            subscription_status,
            plan_starts_at: parse_timestamp(request.plan_starts_at, "planStartsAt")?,
            plan_ends_at: parse_timestamp(request.plan_ends_at, "planEndsAt")?,
            layout: request.layout.into(),
            total_members: request.total_members,
        })
    }
}

/// Community Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CommunityCreatedResponse {
    pub success: bool,
    pub message: String,
    pub community: CommunityResponse,
}

/// Create Community Handler
#[endpoint(
    tags("communities"),
    summary = "Create Community",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Community created"),
        (status_code = StatusCode::CONFLICT, description = "Community already exists"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    json: JsonBody<CreateCommunityRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CommunityCreatedResponse>, ApiError> {
    let admin = depot.authorize(permission::WRITE_COMMUNITIES)?;
    let actor = req.actor(admin);
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let community = state
        .app
        .communities
        .create_community(actor, json.into_inner().try_into()?)
        .await
        .map_err(|error| from_communities_error(error, "Failed to create community"))?;

    res.add_header(LOCATION, format!("/communities/{}", community.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(CommunityCreatedResponse {
        success: true,
        message: "Community created successfully".to_string(),
        community: community.into(),
    }))
}
