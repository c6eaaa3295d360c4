//! Restoration from a snapshot.

use sqlx::{Postgres, Transaction};

use crate::domain::{
    backups::data::CommunitySnapshot,
    communities::{
        data::NewCommunity,
        records::{CommunityRecord, CommunityUuid},
        repository::PgCommunitiesRepository,
    },
    deletion::errors::DeletionServiceError,
    dependents::{DependentCounts, DependentKind, repository::PgDependentsRepository},
};

/// Re-creates a community and its records from a backup snapshot.
#[derive(Debug, Clone, Default)]
pub(crate) struct RestorationEngine {
    communities: PgCommunitiesRepository,
    dependents: PgDependentsRepository,
}

impl RestorationEngine {
    pub(crate) fn new() -> Self {
        Self {
            communities: PgCommunitiesRepository::new(),
            dependents: PgDependentsRepository::new(),
        }
    }

    /// The community is inserted first, under a new uuid. Dependents keep
    /// their own uuids and have their reference fields pointed at it.
    pub(crate) async fn restore(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        snapshot: &CommunitySnapshot,
    ) -> Result<(CommunityRecord, DependentCounts), DeletionServiceError> {
        let original = &snapshot.community;

        let community = self
            .communities
            .insert_community(
                tx,
                CommunityUuid::new(),
                &NewCommunity::from(original.clone()),
                original.created_at,
            )
            .await?;

        let mut counts = DependentCounts::new();

        for kind in DependentKind::ALL {
            let mut documents = snapshot.documents(kind).to_vec();

            for document in &mut documents {
                document.rebind_to(kind, community.uuid.into_uuid());
            }

            let inserted = self
                .dependents
                .insert_many(tx, kind, &documents)
                .await
                .map_err(|error| DeletionServiceError::restoring(kind, error))?;

            counts.set(kind, inserted);
        }

        Ok((community, counts))
    }
}
