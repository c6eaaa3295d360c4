//! Recent Activity Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use townhall_app::{
    auth::{AdminUuid, permissions::permission},
    domain::audit::{
        data::{ActivityFilter, AuditAction},
        records::AuditLogRecord,
    },
};

use crate::{errors::ApiError, extensions::*, state::State};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActivityEntry {
    pub id: Uuid,
    pub admin_id: Option<Uuid>,
    pub admin_email: String,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub target_name: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: String,
}

impl From<AuditLogRecord> for ActivityEntry {
    fn from(record: AuditLogRecord) -> Self {
        Self {
            id: record.uuid.into_uuid(),
            admin_id: record.admin_uuid.map(AdminUuid::into_uuid),
            admin_email: record.admin_email,
            action: record.action.as_str().to_string(),
            target_type: record.target_type.as_str().to_string(),
            target_id: record.target_uuid,
            target_name: record.target_name,
            ip_address: record.ip,
            user_agent: record.user_agent,
            status: record.status.as_str().to_string(),
            error_message: record.error_message,
            created_at: record.created_at.to_string(),
        }
    }
}

/// Activity Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ActivityResponse {
    pub success: bool,
    pub activity: Vec<ActivityEntry>,
}

fn parse_limit(limit: Option<String>) -> Result<u32, ApiError> {
    limit
        .map(|value| value.parse::<u32>())
        .transpose()
        .or_400("limit must be a positive integer")
        .map(|limit| limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT))
}

fn parse_action(action: Option<String>) -> Result<Option<AuditAction>, ApiError> {
    action
        .map(|value| value.parse::<AuditAction>())
        .transpose()
        .or_400("Unknown action")
}

fn parse_bound(
    value: Option<String>,
    message: &'static str,
) -> Result<Option<Timestamp>, ApiError> {
    value
        .map(|value| value.parse::<Timestamp>())
        .transpose()
        .or_400(message)
}

/// Recent Activity Handler
///
/// Newest audit log entries first, optionally filtered to one action and to
/// an inclusive `startDate`..`endDate` window (RFC 3339).
#[endpoint(
    tags("activity"),
    summary = "Recent Admin Activity",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    limit: QueryParam<String, false>,
    action: QueryParam<String, false>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<ActivityResponse>, ApiError> {
    depot.authorize(permission::READ_ANALYTICS)?;

    let filter = ActivityFilter {
        limit: Some(parse_limit(limit.into_inner())?),
        action: parse_action(action.into_inner())?,
        since: parse_bound(req.query("startDate"), "startDate is not a valid timestamp")?,
        until: parse_bound(req.query("endDate"), "endDate is not a valid timestamp")?,
    };

    let state = depot.obtain_or_500::<Arc<State>>()?;

    let activity = state
        .app
        .audit_logs
        .list_activity(filter)
        .await
        .map_err(|source| {
            error!("failed to list audit log: {source}");

            ApiError::internal("Failed to get activity")
        })?;

    Ok(Json(ActivityResponse {
        success: true,
        activity: activity.into_iter().map(Into::into).collect(),
    }))
}
