//! Auth data models.

use jiff::Timestamp;
use uuid::Uuid;

use crate::{
    auth::{ApiTokenVersion, permissions::Role},
    uuids::TypedUuid,
};

/// Admin UUID
pub type AdminUuid = TypedUuid<AdminRecord>;

/// An admin console user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    pub uuid: AdminUuid,
    pub email: String,
    pub role: Role,
    pub created_at: Timestamp,
}

/// New Admin Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    pub email: String,
    pub role: Role,
}

/// API token data used during bearer authentication.
#[derive(Debug, Clone)]
pub(crate) struct ActiveApiToken {
    /// Admin the token authenticates as.
    pub admin: AdminRecord,

    /// Token format/hash version.
    pub version: ApiTokenVersion,

    /// SHA-256 verifier for the token secret material.
    pub token_hash: String,
}

/// API token metadata persisted in storage.
#[derive(Debug, Clone)]
pub struct ApiTokenMetadata {
    pub uuid: Uuid,
    pub admin_uuid: AdminUuid,
    pub version: ApiTokenVersion,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// New API token persistence payload.
#[derive(Debug, Clone)]
pub struct NewApiToken {
    pub uuid: Uuid,
    pub admin_uuid: AdminUuid,
    pub version: ApiTokenVersion,
    pub token_hash: String,
}

/// API token issuance result with one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedApiToken {
    pub token: String,
    pub metadata: ApiTokenMetadata,
}
