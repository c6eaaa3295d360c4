//! Backup Data

use std::collections::BTreeMap;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AdminUuid,
    domain::{
        communities::records::CommunityRecord,
        dependents::{DependentCounts, DependentDocument, DependentKind},
    },
};

/// How long a backup stays restorable.
pub const RETENTION: SignedDuration = SignedDuration::from_hours(30 * 24);

/// Reason stored when the admin gives none.
pub const DEFAULT_REASON: &str = "No reason provided";

/// Everything a community owned at the moment it was deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySnapshot {
    pub community: CommunityRecord,

    #[serde(default)]
    pub collections: BTreeMap<DependentKind, Vec<DependentDocument>>,
}

impl CommunitySnapshot {
    #[must_use]
    pub fn new(community: CommunityRecord) -> Self {
        Self {
            community,
            collections: BTreeMap::new(),
        }
    }

    /// Documents captured for `kind`; empty when none were.
    #[must_use]
    pub fn documents(&self, kind: DependentKind) -> &[DependentDocument] {
        self.collections.get(&kind).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn counts(&self) -> DependentCounts {
        DependentKind::ALL
            .into_iter()
            .map(|kind| (kind, self.documents(kind).len() as u64))
            .collect()
    }
}

/// Who deleted a community, when and why.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionMetadata {
    pub deleted_by: AdminUuid,
    pub deleted_by_email: String,
    pub deleted_at: Timestamp,
    pub reason: String,
    pub counts: DependentCounts,
}

impl DeletionMetadata {
    /// Blank or missing reasons fall back to [`DEFAULT_REASON`].
    #[must_use]
    pub fn normalise_reason(reason: Option<String>) -> String {
        reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty())
            .unwrap_or_else(|| DEFAULT_REASON.to_string())
    }
}

/// New Backup Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewBackup {
    pub snapshot: CommunitySnapshot,
    pub deletion: DeletionMetadata,
}

impl NewBackup {
    #[must_use]
    pub fn permanent_delete_at(&self) -> Timestamp {
        self.deletion.deleted_at + RETENTION
    }
}
