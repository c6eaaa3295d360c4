//! Audit Log Records

use jiff::Timestamp;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    auth::AdminUuid,
    domain::audit::data::{AuditAction, AuditStatus, TargetType},
    uuids::TypedUuid,
};

/// Audit Log UUID
pub type AuditLogUuid = TypedUuid<AuditLogRecord>;

/// Audit log entry as listed in the activity feed. Change payloads are not
/// loaded; `admin_uuid` is empty for entries with no authenticated admin.
#[derive(Debug, Clone)]
pub struct AuditLogRecord {
    pub uuid: AuditLogUuid,
    pub admin_uuid: Option<AdminUuid>,
    pub admin_email: String,
    pub action: AuditAction,
    pub target_type: TargetType,
    pub target_uuid: Option<Uuid>,
    pub target_name: Option<String>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: Timestamp,
}
