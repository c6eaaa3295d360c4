//! Communities Data

use jiff::Timestamp;

use crate::domain::communities::{
    errors::CommunitiesServiceError,
    records::{CommunityLayout, CommunityRecord, SubscriptionStatus},
};

/// New Community Data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCommunity {
    pub name: String,
    pub location: String,
    pub subscription_plan: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub plan_starts_at: Option<Timestamp>,
    pub plan_ends_at: Option<Timestamp>,
    pub layout: CommunityLayout,
    pub total_members: u64,
}

impl NewCommunity {
    /// Reject input the storage layer would refuse, before touching it.
    ///
    /// # Errors
    ///
    /// Returns [`CommunitiesServiceError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<(), CommunitiesServiceError> {
        if self.name.trim().is_empty() {
            return Err(CommunitiesServiceError::Validation("name is required"));
        }

        if self.location.trim().is_empty() {
            return Err(CommunitiesServiceError::Validation("location is required"));
        }

        if let (Some(starts), Some(ends)) = (self.plan_starts_at, self.plan_ends_at)
            && ends < starts
        {
            return Err(CommunitiesServiceError::Validation(
                "plan end must not be before plan start",
            ));
        }

        if self.layout.blocks.iter().any(|block| block.name.trim().is_empty()) {
            return Err(CommunitiesServiceError::Validation("block name is required"));
        }

        Ok(())
    }
}

/// Partial edit of a community. Unset fields keep their current value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommunityUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub subscription_plan: Option<String>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub plan_starts_at: Option<Timestamp>,
    pub plan_ends_at: Option<Timestamp>,
    pub layout: Option<CommunityLayout>,
    pub total_members: Option<u64>,
}

impl CommunityUpdate {
    /// The community as it would be stored after this edit.
    ///
    /// # Errors
    ///
    /// Returns [`CommunitiesServiceError::Validation`] when the merged result is invalid.
    pub fn apply_to(
        self,
        current: CommunityRecord,
    ) -> Result<NewCommunity, CommunitiesServiceError> {
        let current = NewCommunity::from(current);

        let merged = NewCommunity {
            name: self.name.unwrap_or(current.name),
            location: self.location.unwrap_or(current.location),
            subscription_plan: self.subscription_plan.or(current.subscription_plan),
            subscription_status: self.subscription_status.unwrap_or(current.subscription_status),
            plan_starts_at: self.plan_starts_at.or(current.plan_starts_at),
            plan_ends_at: self.plan_ends_at.or(current.plan_ends_at),
            layout: self.layout.unwrap_or(current.layout),
            total_members: self.total_members.unwrap_or(current.total_members),
        };

        merged.validate()?;

        Ok(merged)
    }
}

impl From<CommunityRecord> for NewCommunity {
    fn from(record: CommunityRecord) -> Self {
        Self {
            name: record.name,
            location: record.location,
            subscription_plan: record.subscription_plan,
            subscription_status: record.subscription_status,
            plan_starts_at: record.plan_starts_at,
            plan_ends_at: record.plan_ends_at,
            layout: record.layout,
            total_members: record.total_members,
        }
    }
}
