//! Cascade deletion.

use std::collections::{BTreeMap, BTreeSet};

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{
    backups::data::CommunitySnapshot,
    communities::{
        records::{CommunityRecord, CommunityUuid},
        repository::PgCommunitiesRepository,
    },
    deletion::errors::DeletionServiceError,
    dependents::{
        DependentCounts, DependentDocument, DependentKind, repository::PgDependentsRepository,
    },
};

/// Removes a community row and every record it owns.
#[derive(Debug, Clone, Default)]
pub(crate) struct CascadeDeleter {
    communities: PgCommunitiesRepository,
    dependents: PgDependentsRepository,
}

/// Rows removed by one cascade, exactly as the deletes returned them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Removed {
    pub(crate) community: Option<CommunityRecord>,
    pub(crate) collections: BTreeMap<DependentKind, Vec<DependentDocument>>,
}

impl Removed {
    pub(crate) fn counts(&self) -> DependentCounts {
        self.collections
            .iter()
            .map(|(kind, documents)| (*kind, documents.len() as u64))
            .collect()
    }

    /// The removed rows as a backup snapshot. `loaded` stands in for the
    /// community row when the delete found nothing to return.
    pub(crate) fn into_snapshot(self, loaded: CommunityRecord) -> CommunitySnapshot {
        CommunitySnapshot {
            community: self.community.unwrap_or(loaded),
            collections: self.collections,
        }
    }
}

impl CascadeDeleter {
    pub(crate) fn new() -> Self {
        Self {
            communities: PgCommunitiesRepository::new(),
            dependents: PgDependentsRepository::new(),
        }
    }

    /// Deletes dependents kind by kind, then the community row. Running it
    /// again for the same community deletes nothing and reports zeros.
    pub(crate) async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        community: CommunityUuid,
    ) -> Result<Removed, DeletionServiceError> {
        let mut removed = Removed::default();
        let mut referenced = BTreeSet::<Uuid>::new();

        for kind in DependentKind::ALL {
            let also: Vec<Uuid> = if kind == DependentKind::Notifications {
                referenced.iter().copied().collect()
            } else {
                Vec::new()
            };

            let documents = self
                .dependents
                .delete_owned(tx, kind, community.into_uuid(), &also)
                .await
                .map_err(|source| DeletionServiceError::CascadeFailed { kind, source })?;

            if kind.carries_notifications() {
                referenced.extend(documents.iter().flat_map(|doc| doc.notification_refs()));
            }

            tracing::debug!(%community, %kind, deleted = documents.len(), "cascade step");

            removed.collections.insert(kind, documents);
        }

        removed.community = self.communities.delete_community(tx, community).await?;

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        domain::deletion::snapshot::SnapshotCollector,
        test::{
            TestContext,
            helpers::{create_community, seed_dependent},
        },
    };

    use super::*;

    #[tokio::test]
    async fn removes_rows_inserted_after_the_snapshot_was_read() -> TestResult {
        let ctx = TestContext::new().await;
        let community = create_community(&ctx, "Maple Court").await?;
        let id = community.uuid.into_uuid().to_string();

        let early = seed_dependent(
            &ctx,
            DependentKind::Residents,
            json!({ "name": "Ana", "community": id }),
        )
        .await?;

        let db = ctx.app_db();
        let mut tx = db.begin_locked_transaction(community.uuid.into_uuid()).await?;

        let snapshot = SnapshotCollector::new().collect(&mut tx, community.uuid).await?;
        assert_eq!(snapshot.counts().get(DependentKind::Residents), 1);

        let late = seed_dependent(
            &ctx,
            DependentKind::Residents,
            json!({ "name": "Ben", "community": id }),
        )
        .await?;

        let removed = CascadeDeleter::new().delete(&mut tx, community.uuid).await?;

        let residents: Vec<Uuid> = removed
            .collections
            .get(&DependentKind::Residents)
            .map(|docs| docs.iter().map(|doc| doc.uuid).collect())
            .unwrap_or_default();

        assert_eq!(residents.len(), 2);
        assert!(residents.contains(&early), "early resident missing");
        assert!(residents.contains(&late), "late resident missing");
        assert_eq!(removed.counts().get(DependentKind::Residents), 2);

        assert_eq!(removed.community.as_ref(), Some(&community));

        let snapshot = removed.into_snapshot(community.clone());
        assert_eq!(snapshot.documents(DependentKind::Residents).len(), 2);

        tx.rollback().await?;

        Ok(())
    }

    #[tokio::test]
    async fn second_cascade_reports_zeros() -> TestResult {
        let ctx = TestContext::new().await;
        let community = create_community(&ctx, "Maple Court").await?;
        let id = community.uuid.into_uuid().to_string();

        seed_dependent(
            &ctx,
            DependentKind::Residents,
            json!({ "name": "Ana", "community": id }),
        )
        .await?;
        seed_dependent(
            &ctx,
            DependentKind::Payments,
            json!({ "amount": 120, "communityId": id }),
        )
        .await?;

        let cascade = CascadeDeleter::new();
        let db = ctx.app_db();

        let mut tx = db.begin_transaction().await?;
        let first = cascade.delete(&mut tx, community.uuid).await?;
        tx.commit().await?;

        assert!(first.community.is_some());
        assert_eq!(first.counts().total(), 2);

        let mut tx = db.begin_transaction().await?;
        let second = cascade.delete(&mut tx, community.uuid).await?;
        tx.commit().await?;

        assert!(second.community.is_none());
        assert_eq!(second.counts(), DependentCounts::new());

        Ok(())
    }

    #[tokio::test]
    async fn cascade_on_missing_community_reports_zeros() -> TestResult {
        let ctx = TestContext::new().await;
        let db = ctx.app_db();

        let mut tx = db.begin_transaction().await?;
        let removed = CascadeDeleter::new().delete(&mut tx, CommunityUuid::new()).await?;
        tx.rollback().await?;

        assert!(removed.community.is_none());
        assert_eq!(removed.counts(), DependentCounts::new());

        for kind in DependentKind::ALL {
            assert_eq!(removed.counts().get(kind), 0, "{kind} should be zero");
        }

        Ok(())
    }
}
