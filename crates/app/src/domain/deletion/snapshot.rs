//! Snapshot collection.

use std::collections::BTreeSet;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{
    backups::data::CommunitySnapshot,
    communities::{
        records::{CommunityRecord, CommunityUuid},
        repository::PgCommunitiesRepository,
    },
    deletion::errors::DeletionServiceError,
    dependents::{DependentKind, repository::PgDependentsRepository},
};

/// Reads a community and everything it owns.
#[derive(Debug, Clone, Default)]
pub(crate) struct SnapshotCollector {
    communities: PgCommunitiesRepository,
    dependents: PgDependentsRepository,
}

impl SnapshotCollector {
    pub(crate) fn new() -> Self {
        Self {
            communities: PgCommunitiesRepository::new(),
            dependents: PgDependentsRepository::new(),
        }
    }

    /// The community row alone, or `CommunityNotFound`.
    pub(crate) async fn community(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        community: CommunityUuid,
    ) -> Result<CommunityRecord, DeletionServiceError> {
        self.communities
            .get_community(tx, community)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => DeletionServiceError::CommunityNotFound,
                other => other.into(),
            })
    }

    /// Notifications are the union of those owned directly and those listed
    /// by owners carrying notification references.
    pub(crate) async fn collect(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        community: CommunityUuid,
    ) -> Result<CommunitySnapshot, DeletionServiceError> {
        let record = self.community(tx, community).await?;

        let mut snapshot = CommunitySnapshot::new(record);
        let mut referenced = BTreeSet::<Uuid>::new();

        for kind in DependentKind::ALL {
            let also: Vec<Uuid> = if kind == DependentKind::Notifications {
                referenced.iter().copied().collect()
            } else {
                Vec::new()
            };

            let documents = self
                .dependents
                .find_owned(tx, kind, community.into_uuid(), &also)
                .await?;

            if kind.carries_notifications() {
                referenced.extend(documents.iter().flat_map(|doc| doc.notification_refs()));
            }

            snapshot.collections.insert(kind, documents);
        }

        Ok(snapshot)
    }
}
