//! Community Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Community UUID
pub type CommunityUuid = TypedUuid<CommunityRecord>;

/// Community Record
///
/// Serialised verbatim into deletion backups, so field names are part of the
/// stored snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityRecord {
    pub uuid: CommunityUuid,
    pub name: String,
    pub location: String,
    pub subscription_plan: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub plan_starts_at: Option<Timestamp>,
    pub plan_ends_at: Option<Timestamp>,
    pub layout: CommunityLayout,
    pub total_members: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Pending,
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown subscription status: {0}")]
pub struct UnknownSubscriptionStatus(pub String);

impl FromStr for SubscriptionStatus {
    type Err = UnknownSubscriptionStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownSubscriptionStatus(other.to_string())),
        }
    }
}

/// Physical layout of a community.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommunityLayout {
    #[serde(default)]
    pub blocks: Vec<BlockLayout>,
}

impl CommunityLayout {
    /// Units across every block.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.blocks
            .iter()
            .map(|block| u64::from(block.floors) * u64::from(block.units_per_floor))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLayout {
    pub name: String,
    pub floors: u32,
    pub units_per_floor: u32,
}
