//! Backup Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    auth::AdminUuid,
    domain::{
        backups::data::{CommunitySnapshot, DeletionMetadata},
        communities::records::CommunityUuid,
    },
    uuids::TypedUuid,
};

/// Backup UUID
pub type BackupUuid = TypedUuid<BackupRecord>;

/// Backup Record
#[derive(Debug, Clone, PartialEq)]
pub struct BackupRecord {
    pub uuid: BackupUuid,
    pub original_community_uuid: CommunityUuid,
    pub snapshot: CommunitySnapshot,
    pub deletion: DeletionMetadata,
    pub permanent_delete_at: Timestamp,
    pub status: BackupStatus,
    pub restored_at: Option<Timestamp>,
    pub restored_by: Option<AdminUuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupStatus {
    #[default]
    Pending,
    Restored,
    PermanentlyDeleted,
}

impl BackupStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Restored => "restored",
            Self::PermanentlyDeleted => "permanently_deleted",
        }
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backup status: {0}")]
pub struct UnknownBackupStatus(pub String);

impl FromStr for BackupStatus {
    type Err = UnknownBackupStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "restored" => Ok(Self::Restored),
            "permanently_deleted" => Ok(Self::PermanentlyDeleted),
            other => Err(UnknownBackupStatus(other.to_string())),
        }
    }
}

/// Why a backup cannot be restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RestoreBlocked {
    #[error("Backup expired, cannot restore")]
    Expired,

    #[error("Community already restored")]
    AlreadyRestored,

    #[error("Backup permanently deleted, cannot restore")]
    PermanentlyDeleted,
}

impl BackupRecord {
    /// Check the backup can be restored at `now`.
    ///
    /// Expiry is checked first and wins over every status.
    ///
    /// # Errors
    ///
    /// Returns the [`RestoreBlocked`] reason when it cannot.
    pub fn ensure_restorable(&self, now: Timestamp) -> Result<(), RestoreBlocked> {
        if now > self.permanent_delete_at {
            return Err(RestoreBlocked::Expired);
        }

        match self.status {
            BackupStatus::Pending => Ok(()),
            BackupStatus::Restored => Err(RestoreBlocked::AlreadyRestored),
            BackupStatus::PermanentlyDeleted => Err(RestoreBlocked::PermanentlyDeleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use crate::domain::{
        backups::data::RETENTION,
        communities::records::{CommunityLayout, CommunityRecord, SubscriptionStatus},
        dependents::DependentCounts,
    };

    use super::*;

    fn backup(status: BackupStatus, deleted_at: Timestamp) -> BackupRecord {
        let community = CommunityRecord {
            uuid: CommunityUuid::new(),
            name: "Maple Court".to_string(),
            location: "12 Elm Street".to_string(),
            subscription_plan: None,
            subscription_status: SubscriptionStatus::Active,
            plan_starts_at: None,
            plan_ends_at: None,
            layout: CommunityLayout::default(),
            total_members: 0,
            created_at: deleted_at,
            updated_at: deleted_at,
        };

        BackupRecord {
            uuid: BackupUuid::new(),
            original_community_uuid: community.uuid,
            snapshot: CommunitySnapshot::new(community),
            deletion: DeletionMetadata {
                deleted_by: AdminUuid::new(),
                deleted_by_email: "ops@example.com".to_string(),
                deleted_at,
                reason: "duplicate".to_string(),
                counts: DependentCounts::new(),
            },
            permanent_delete_at: deleted_at + RETENTION,
            status,
            restored_at: None,
            restored_by: None,
            created_at: deleted_at,
            updated_at: deleted_at,
        }
    }

    #[test]
    fn pending_backup_within_retention_is_restorable() {
        let now = Timestamp::now();

        assert_eq!(backup(BackupStatus::Pending, now).ensure_restorable(now), Ok(()));
    }

    #[test]
    fn restorable_on_the_last_instant_of_retention() {
        let deleted_at = Timestamp::now();
        let record = backup(BackupStatus::Pending, deleted_at);

        assert_eq!(record.ensure_restorable(record.permanent_delete_at), Ok(()));
    }

    #[test]
    fn restored_backup_is_blocked() {
        let now = Timestamp::now();

        assert_eq!(
            backup(BackupStatus::Restored, now).ensure_restorable(now),
            Err(RestoreBlocked::AlreadyRestored)
        );
    }

    #[test]
    fn permanently_deleted_backup_is_blocked() {
        let now = Timestamp::now();

        assert_eq!(
            backup(BackupStatus::PermanentlyDeleted, now).ensure_restorable(now),
            Err(RestoreBlocked::PermanentlyDeleted)
        );
    }

    #[test]
    fn expiry_wins_over_status() {
        let deleted_at = Timestamp::now() - RETENTION - SignedDuration::from_hours(1);
        let now = Timestamp::now();

        for status in [
            BackupStatus::Pending,
            BackupStatus::Restored,
            BackupStatus::PermanentlyDeleted,
        ] {
            assert_eq!(
                backup(status, deleted_at).ensure_restorable(now),
                Err(RestoreBlocked::Expired),
                "status {status}"
            );
        }
    }

    #[test]
    fn status_round_trips_through_stored_names() {
        for status in [
            BackupStatus::Pending,
            BackupStatus::Restored,
            BackupStatus::PermanentlyDeleted,
        ] {
            assert_eq!(status.as_str().parse::<BackupStatus>(), Ok(status));
        }
    }
}
