//! Dependent Kinds

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every collection that holds records owned by a community.
///
/// Declaration order is processing order; notifications come last because
/// owners of other kinds reference them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependentKind {
    Residents,
    Workers,
    Securities,
    CommunityManagers,
    Amenities,
    CommonSpaces,
    Issues,
    Payments,
    Subscriptions,
    Visitors,
    Preapprovals,
    Ads,
    Notifications,
}

/// Storage details for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub table: &'static str,

    /// Document fields that may hold the owning community's uuid. The first
    /// entry is the current field; the rest are legacy spellings.
    pub reference_fields: &'static [&'static str],

    /// Whether documents hold a `notifications` array of notification uuids.
    pub carries_notifications: bool,
}

impl DependentKind {
    pub const ALL: [Self; 13] = [
        Self::Residents,
        Self::Workers,
        Self::Securities,
        Self::CommunityManagers,
        Self::Amenities,
        Self::CommonSpaces,
        Self::Issues,
        Self::Payments,
        Self::Subscriptions,
        Self::Visitors,
        Self::Preapprovals,
        Self::Ads,
        Self::Notifications,
    ];

    #[must_use]
    pub const fn collection(self) -> Collection {
        match self {
            Self::Residents => Collection {
                table: "residents",
                reference_fields: &["community"],
                carries_notifications: true,
            },
            Self::Workers => Collection {
                table: "workers",
                reference_fields: &["community", "communityAssigned"],
                carries_notifications: true,
            },
            Self::Securities => Collection {
                table: "securities",
                reference_fields: &["community", "communityAssigned"],
                carries_notifications: true,
            },
            Self::CommunityManagers => Collection {
                table: "community_managers",
                reference_fields: &["assignedCommunity", "communityAssigned"],
                carries_notifications: true,
            },
            Self::Amenities => Collection {
                table: "amenities",
                reference_fields: &["community"],
                carries_notifications: false,
            },
            Self::CommonSpaces => Collection {
                table: "common_space_bookings",
                reference_fields: &["community"],
                carries_notifications: false,
            },
            Self::Issues => Collection {
                table: "issues",
                reference_fields: &["community"],
                carries_notifications: false,
            },
            Self::Payments => Collection {
                table: "payments",
                reference_fields: &["community", "communityId"],
                carries_notifications: false,
            },
            Self::Subscriptions => Collection {
                table: "community_subscriptions",
                reference_fields: &["communityId", "community"],
                carries_notifications: false,
            },
            Self::Visitors => Collection {
                table: "visitors",
                reference_fields: &["community"],
                carries_notifications: false,
            },
            Self::Preapprovals => Collection {
                table: "visitor_preapprovals",
                reference_fields: &["community"],
                carries_notifications: false,
            },
            Self::Ads => Collection {
                table: "advertisements",
                reference_fields: &["community"],
                carries_notifications: false,
            },
            Self::Notifications => Collection {
                table: "notifications",
                reference_fields: &["community"],
                carries_notifications: false,
            },
        }
    }

    /// Name used in JSON payloads and backup snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Residents => "residents",
            Self::Workers => "workers",
            Self::Securities => "securities",
            Self::CommunityManagers => "communityManagers",
            Self::Amenities => "amenities",
            Self::CommonSpaces => "commonSpaces",
            Self::Issues => "issues",
            Self::Payments => "payments",
            Self::Subscriptions => "subscriptions",
            Self::Visitors => "visitors",
            Self::Preapprovals => "preapprovals",
            Self::Ads => "ads",
            Self::Notifications => "notifications",
        }
    }

    /// Field written when a restored document carries no reference at all.
    #[must_use]
    pub const fn primary_field(self) -> &'static str {
        match self.collection().reference_fields {
            [first, ..] => first,
            [] => "community",
        }
    }

    #[must_use]
    pub const fn carries_notifications(self) -> bool {
        self.collection().carries_notifications
    }
}

impl fmt::Display for DependentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dependent kind: {0}")]
pub struct UnknownDependentKind(pub String);

impl FromStr for DependentKind {
    type Err = UnknownDependentKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownDependentKind(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn every_kind_has_a_distinct_table() {
        let tables: HashSet<_> = DependentKind::ALL
            .iter()
            .map(|kind| kind.collection().table)
            .collect();

        assert_eq!(tables.len(), DependentKind::ALL.len());
    }

    #[test]
    fn every_kind_has_at_least_one_reference_field() {
        for kind in DependentKind::ALL {
            assert!(
                !kind.collection().reference_fields.is_empty(),
                "{kind} has no reference fields"
            );
        }
    }

    #[test]
    fn notifications_are_processed_last() {
        assert_eq!(DependentKind::ALL.last(), Some(&DependentKind::Notifications));
        assert!(DependentKind::ALL.is_sorted());
    }

    #[test]
    fn only_people_carry_notifications() {
        let carriers: Vec<_> = DependentKind::ALL
            .into_iter()
            .filter(|kind| kind.carries_notifications())
            .collect();

        assert_eq!(
            carriers,
            vec![
                DependentKind::Residents,
                DependentKind::Workers,
                DependentKind::Securities,
                DependentKind::CommunityManagers,
            ]
        );
    }

    #[test]
    fn names_match_serde_representation() -> TestResult {
        for kind in DependentKind::ALL {
            assert_eq!(serde_json::to_value(kind)?, serde_json::json!(kind.as_str()));
            assert_eq!(kind.as_str().parse::<DependentKind>()?, kind);
        }

        Ok(())
    }

    #[test]
    fn managers_prefer_assigned_community() {
        assert_eq!(
            DependentKind::CommunityManagers.primary_field(),
            "assignedCommunity"
        );
        assert_eq!(DependentKind::Subscriptions.primary_field(), "communityId");
    }

    #[test]
    fn unknown_names_are_rejected() {
        let error = "visitors".parse::<DependentKind>().unwrap_err();

        assert_eq!(error, UnknownDependentKind("visitors".to_string()));
        assert_eq!(error.to_string(), "unknown dependent kind: visitors");
    }
}
