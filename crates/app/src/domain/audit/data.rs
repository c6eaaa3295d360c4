//! Audit Log Data

use std::str::FromStr;

use jiff::Timestamp;
use serde_json::Value;
use uuid::Uuid;

use crate::{auth::AdminUuid, domain::audit::AuditLogError};

/// The admin performing an action, plus where the request came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub admin_uuid: AdminUuid,
    pub email: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Kind of admin action being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    Login,
    Logout,
    FailedLogin,
    CreateCommunity,
    UpdateCommunity,
    DeleteCommunity,
    RestoreCommunity,
    CreateUser,
    UpdateUser,
    DeleteUser,
    ApproveApplication,
    RejectApplication,
    UpdatePayment,
    UpdateSubscription,
    ChangePassword,
    UpdateProfile,
    SystemConfigChange,
    BulkOperation,
    Other,
}

impl AuditAction {
    pub const ALL: [Self; 19] = [
        Self::Login,
        Self::Logout,
        Self::FailedLogin,
        Self::CreateCommunity,
        Self::UpdateCommunity,
        Self::DeleteCommunity,
        Self::RestoreCommunity,
        Self::CreateUser,
        Self::UpdateUser,
        Self::DeleteUser,
        Self::ApproveApplication,
        Self::RejectApplication,
        Self::UpdatePayment,
        Self::UpdateSubscription,
        Self::ChangePassword,
        Self::UpdateProfile,
        Self::SystemConfigChange,
        Self::BulkOperation,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::FailedLogin => "failed_login",
            Self::CreateCommunity => "create_community",
            Self::UpdateCommunity => "update_community",
            Self::DeleteCommunity => "delete_community",
            Self::RestoreCommunity => "restore_community",
            Self::CreateUser => "create_user",
            Self::UpdateUser => "update_user",
            Self::DeleteUser => "delete_user",
            Self::ApproveApplication => "approve_application",
            Self::RejectApplication => "reject_application",
            Self::UpdatePayment => "update_payment",
            Self::UpdateSubscription => "update_subscription",
            Self::ChangePassword => "change_password",
            Self::UpdateProfile => "update_profile",
            Self::SystemConfigChange => "system_config_change",
            Self::BulkOperation => "bulk_operation",
            Self::Other => "other",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AuditLogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AuditLogError::UnknownValue {
                field: "action",
                value: value.to_string(),
            })
    }
}

/// Kind of record an audit entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    Community,
    Resident,
    Security,
    Worker,
    CommunityManager,
    InterestForm,
    Payment,
    Subscription,
    Admin,
    System,
    Other,
}

impl TargetType {
    const ALL: [Self; 11] = [
        Self::Community,
        Self::Resident,
        Self::Security,
        Self::Worker,
        Self::CommunityManager,
        Self::InterestForm,
        Self::Payment,
        Self::Subscription,
        Self::Admin,
        Self::System,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Community => "Community",
            Self::Resident => "Resident",
            Self::Security => "Security",
            Self::Worker => "Worker",
            Self::CommunityManager => "CommunityManager",
            Self::InterestForm => "InterestForm",
            Self::Payment => "Payment",
            Self::Subscription => "Subscription",
            Self::Admin => "Admin",
            Self::System => "System",
            Self::Other => "Other",
        }
    }
}

impl FromStr for TargetType {
    type Err = AuditLogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == value)
            .ok_or_else(|| AuditLogError::UnknownValue {
                field: "target_type",
                value: value.to_string(),
            })
    }
}

/// Outcome of the audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditStatus {
    #[default]
    Success,
    Failed,
    Partial,
}

impl AuditStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Partial => "partial",
        }
    }
}

impl FromStr for AuditStatus {
    type Err = AuditLogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "partial" => Ok(Self::Partial),
            _ => Err(AuditLogError::UnknownValue {
                field: "status",
                value: value.to_string(),
            }),
        }
    }
}

/// Record an audit entry is about.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditTarget {
    pub kind: TargetType,
    pub uuid: Option<Uuid>,
    pub name: Option<String>,
}

/// Before/after payload of a change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuditChanges {
    pub before: Option<Value>,
    pub after: Option<Value>,
}

/// Which entries an activity query returns. Unset fields do not filter;
/// both time bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub limit: Option<u32>,
    pub action: Option<AuditAction>,
    pub since: Option<Timestamp>,
    pub until: Option<Timestamp>,
}

/// Email stored for entries with no authenticated admin.
pub const UNKNOWN_ADMIN_EMAIL: &str = "unknown";

/// New Audit Entry Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub admin_uuid: Option<AdminUuid>,
    pub admin_email: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub action: AuditAction,
    pub target: AuditTarget,
    pub changes: Option<AuditChanges>,
    pub metadata: Option<Value>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
}

impl NewAuditEntry {
    /// A successful action against a community.
    #[must_use]
    pub fn community(
        actor: Actor,
        action: AuditAction,
        community: Uuid,
        name: impl Into<String>,
    ) -> Self {
        Self {
            admin_uuid: Some(actor.admin_uuid),
            admin_email: actor.email,
            ip: actor.ip,
            user_agent: actor.user_agent,
            action,
            target: AuditTarget {
                kind: TargetType::Community,
                uuid: Some(community),
                name: Some(name.into()),
            },
            changes: None,
            metadata: None,
            status: AuditStatus::Success,
            error_message: None,
        }
    }

    /// A rejected credential. The caller is unauthenticated, so the entry
    /// carries only what the client sent.
    #[must_use]
    pub fn failed_login(
        ip: Option<String>,
        user_agent: Option<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            admin_uuid: None,
            admin_email: UNKNOWN_ADMIN_EMAIL.to_string(),
            ip,
            user_agent,
            action: AuditAction::FailedLogin,
            target: AuditTarget {
                kind: TargetType::System,
                uuid: None,
                name: None,
            },
            changes: None,
            metadata: None,
            status: AuditStatus::Failed,
            error_message: Some(reason.into()),
        }
    }

    #[must_use]
    pub fn with_changes(mut self, before: Option<Value>, after: Option<Value>) -> Self {
        self.changes = Some(AuditChanges { before, after });
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
