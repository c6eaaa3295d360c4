//! Deletion Data

use jiff::Timestamp;

use crate::domain::{
    backups::BackupUuid, communities::records::CommunityRecord, dependents::DependentCounts,
};

/// What deleting a community would remove right now.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletePreview {
    pub community: CommunityRecord,
    pub counts: DependentCounts,
}

/// Outcome of a committed delete.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedCommunity {
    pub community: CommunityRecord,
    pub backup: BackupUuid,
    pub can_restore_until: Timestamp,
    pub deleted: DependentCounts,
}

/// Outcome of a committed restore.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredCommunity {
    pub community: CommunityRecord,
    pub backup: BackupUuid,
    pub restored: DependentCounts,
}
