//! Role-based access control.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Support,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super-admin",
            Self::Admin => "admin",
            Self::Support => "support",
        }
    }

    /// Permissions granted to the role. May contain `*` or `action:*` wildcards.
    #[must_use]
    pub const fn permissions(self) -> &'static [&'static str] {
        match self {
            Self::SuperAdmin => &["*"],
            Self::Admin => &[
                "read:communities",
                "read:users",
                "read:applications",
                "read:payments",
                "read:issues",
                "read:analytics",
                "write:communities",
                "write:users",
                "write:applications",
                "write:issues",
                "delete:users",
                "delete:issues",
            ],
            Self::Support => &[
                "read:communities",
                "read:users",
                "read:applications",
                "read:issues",
                "write:issues",
                "write:applications",
            ],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "super-admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "support" => Ok(Self::Support),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Permissions checked by routes.
pub mod permission {
    pub const READ_COMMUNITIES: &str = "read:communities";
    pub const WRITE_COMMUNITIES: &str = "write:communities";
    pub const READ_ANALYTICS: &str = "read:analytics";

    /// Irreversible or destructive operations.
    pub const DELETE_CRITICAL: &str = "delete:critical";
}

/// Whether `role` grants `permission`.
#[must_use]
pub fn has_permission(role: Role, permission: &str) -> bool {
    grants(role.permissions(), permission)
}

/// Whether any of `granted` covers `permission`, honouring `*` and
/// `action:*` grants.
fn grants(granted: &[&str], permission: &str) -> bool {
    let action_wildcard = permission
        .split_once(':')
        .map(|(action, _)| format!("{action}:*"));

    granted.iter().any(|grant| {
        *grant == "*" || *grant == permission || action_wildcard.as_deref() == Some(*grant)
    })
}

#[cfg(test)]
mod tests {
    use super::{permission::*, *};

    #[test]
    fn super_admin_has_everything() {
        assert!(has_permission(Role::SuperAdmin, DELETE_CRITICAL));
        assert!(has_permission(Role::SuperAdmin, "write:anything"));
    }

    #[test]
    fn admin_cannot_delete_communities() {
        assert!(has_permission(Role::Admin, WRITE_COMMUNITIES));
        assert!(has_permission(Role::Admin, READ_ANALYTICS));
        assert!(!has_permission(Role::Admin, DELETE_CRITICAL));
    }

    #[test]
    fn support_is_read_mostly() {
        assert!(has_permission(Role::Support, READ_COMMUNITIES));
        assert!(has_permission(Role::Support, "write:issues"));
        assert!(!has_permission(Role::Support, WRITE_COMMUNITIES));
        assert!(!has_permission(Role::Support, READ_ANALYTICS));
    }

    #[test]
    fn action_wildcard_grants_every_resource() {
        assert!(grants(&["read:*"], "read:payments"));
        assert!(!grants(&["read:*"], "write:payments"));
        assert!(!grants(&["read:*"], "read"));
    }

    #[test]
    fn roles_round_trip_through_stored_names() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Support] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }

        assert!("owner".parse::<Role>().is_err());
    }
}
