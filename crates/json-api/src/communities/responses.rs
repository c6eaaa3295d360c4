//! Community response bodies.

use std::{collections::BTreeMap, string::ToString};

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use townhall_app::domain::{
    communities::records::{CommunityLayout, CommunityRecord},
    dependents::DependentCounts,
};

/// Records per dependent kind, keyed by the kind's camelCase name.
pub(crate) type KindCounts = BTreeMap<String, u64>;

pub(crate) fn kind_counts(counts: &DependentCounts) -> KindCounts {
    counts
        .iter()
        .map(|(kind, count)| (kind.as_str().to_string(), count))
        .collect()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BlockResponse {
    pub name: String,
    pub floors: u32,
    pub units_per_floor: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LayoutResponse {
    pub blocks: Vec<BlockResponse>,
}

impl From<CommunityLayout> for LayoutResponse {
    fn from(layout: CommunityLayout) -> Self {
        Self {
            blocks: layout
                .blocks
                .into_iter()
                .map(|block| BlockResponse {
                    name: block.name,
                    floors: block.floors,
                    units_per_floor: block.units_per_floor,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommunityResponse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub subscription_plan: Option<String>,
    pub subscription_status: String,
    pub plan_starts_at: Option<String>,
    pub plan_ends_at: Option<String>,
    pub layout: LayoutResponse,

    /// Units across every block of the layout.
    pub total_units: u64,
    pub total_members: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommunityRecord> for CommunityResponse {
    fn from(community: CommunityRecord) -> Self {
        Self {
            id: community.uuid.into_uuid(),
            total_units: community.layout.total_units(),
            name: community.name,
            location: community.location,
            subscription_plan: community.subscription_plan,
            subscription_status: community.subscription_status.to_string(),
            plan_starts_at: community.plan_starts_at.as_ref().map(ToString::to_string),
            plan_ends_at: community.plan_ends_at.as_ref().map(ToString::to_string),
            layout: community.layout.into(),
            total_members: community.total_members,
            created_at: community.created_at.to_string(),
            updated_at: community.updated_at.to_string(),
        }
    }
}

/// The identifying fields of a community.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CommunitySummary {
    pub id: Uuid,
    pub name: String,
    pub location: String,
}

impl From<CommunityRecord> for CommunitySummary {
    fn from(community: CommunityRecord) -> Self {
        Self {
            id: community.uuid.into_uuid(),
            name: community.name,
            location: community.location,
        }
    }
}
