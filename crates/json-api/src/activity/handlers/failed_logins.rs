//! Failed Logins Handler

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use townhall_app::{
    auth::permissions::permission,
    domain::audit::{
        data::{ActivityFilter, AuditAction},
        records::AuditLogRecord,
    },
};

use crate::{errors::ApiError, extensions::*, state::State};

const DEFAULT_HOURS: u32 = 24;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FailedLogin {
    pub admin_email: String,
    pub ip: Option<String>,
    pub created_at: String,
    pub metadata: Option<Value>,
}

impl From<AuditLogRecord> for FailedLogin {
    fn from(record: AuditLogRecord) -> Self {
        Self {
            admin_email: record.admin_email,
            ip: record.ip,
            created_at: record.created_at.to_string(),
            metadata: record.metadata,
        }
    }
}

/// Failed Logins Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct FailedLoginsResponse {
    pub success: bool,
    pub data: Vec<FailedLogin>,
    pub count: usize,
}

fn window_start(hours: Option<String>, now: Timestamp) -> Result<Timestamp, ApiError> {
    let hours = hours
        .map(|value| value.parse::<u32>())
        .transpose()
        .or_400("hours must be a positive integer")?
        .unwrap_or(DEFAULT_HOURS);

    if hours == 0 {
        return Err(ApiError::bad_request("hours must be a positive integer"));
    }

    now.checked_sub(SignedDuration::from_hours(i64::from(hours)))
        .or_400("hours is out of range")
}

/// Failed Logins Handler
///
/// Rejected credentials from the last `hours` hours (24 by default), newest
/// first.
#[endpoint(
    tags("security"),
    summary = "Recent Failed Logins",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    hours: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<FailedLoginsResponse>, ApiError> {
    depot.authorize(permission::READ_ANALYTICS)?;

    let since = window_start(hours.into_inner(), Timestamp::now())?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    let attempts = state
        .app
        .audit_logs
        .list_activity(ActivityFilter {
            action: Some(AuditAction::FailedLogin),
            since: Some(since),
            ..ActivityFilter::default()
        })
        .await
        .map_err(|source| {
            error!("failed to list failed logins: {source}");

            ApiError::internal("Failed to get failed logins")
        })?;

    let data: Vec<FailedLogin> = attempts.into_iter().map(Into::into).collect();

    Ok(Json(FailedLoginsResponse {
        success: true,
        count: data.len(),
        data,
    }))
}
