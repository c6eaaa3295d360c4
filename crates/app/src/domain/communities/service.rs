//! Communities service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        audit::{
            AuditLogService,
            data::{Actor, AuditAction, NewAuditEntry},
            record_after_commit,
        },
        communities::{
            data::{CommunityUpdate, NewCommunity},
            errors::CommunitiesServiceError,
            records::{CommunityRecord, CommunityUuid},
            repository::PgCommunitiesRepository,
        },
    },
};

#[derive(Clone)]
pub struct PgCommunitiesService {
    db: Db,
    repository: PgCommunitiesRepository,
    audit: Arc<dyn AuditLogService>,
}

impl fmt::Debug for PgCommunitiesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCommunitiesService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgCommunitiesService {
    #[must_use]
    pub fn new(db: Db, audit: Arc<dyn AuditLogService>) -> Self {
        Self {
            db,
            repository: PgCommunitiesRepository::new(),
            audit,
        }
    }
}

#[async_trait]
impl CommunitiesService for PgCommunitiesService {
    async fn list_communities(&self) -> Result<Vec<CommunityRecord>, CommunitiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let communities = self.repository.list_communities(&mut tx).await?;

        tx.commit().await?;

        Ok(communities)
    }

    async fn get_community(
        &self,
        community: CommunityUuid,
    ) -> Result<CommunityRecord, CommunitiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let community = self.repository.get_community(&mut tx, community).await?;

        tx.commit().await?;

        Ok(community)
    }

    async fn create_community(
        &self,
        actor: Actor,
        community: NewCommunity,
    ) -> Result<CommunityRecord, CommunitiesServiceError> {
        community.validate()?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .repository
            .insert_community(&mut tx, CommunityUuid::new(), &community, Timestamp::now())
            .await?;

        tx.commit().await?;

        tracing::info!(community = %created.uuid, name = %created.name, "community created");

        let entry = NewAuditEntry::community(
            actor,
            AuditAction::CreateCommunity,
            created.uuid.into_uuid(),
            created.name.clone(),
        )
        .with_changes(None, serde_json::to_value(&created).ok());

        record_after_commit(self.audit.as_ref(), entry).await;

        Ok(created)
    }

    async fn update_community(
        &self,
        actor: Actor,
        community: CommunityUuid,
        update: CommunityUpdate,
    ) -> Result<CommunityRecord, CommunitiesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let before = self.repository.lock_community(&mut tx, community).await?;

        let merged = update.apply_to(before.clone())?;

        let updated = self
            .repository
            .update_community(&mut tx, community, &merged, Timestamp::now())
            .await?;

        tx.commit().await?;

        tracing::info!(community = %updated.uuid, name = %updated.name, "community updated");

        let entry = NewAuditEntry::community(
            actor,
            AuditAction::UpdateCommunity,
            updated.uuid.into_uuid(),
            updated.name.clone(),
        )
        .with_changes(
            serde_json::to_value(&before).ok(),
            serde_json::to_value(&updated).ok(),
        );

        record_after_commit(self.audit.as_ref(), entry).await;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait CommunitiesService: Send + Sync {
    /// Retrieves all communities, newest first.
    async fn list_communities(&self) -> Result<Vec<CommunityRecord>, CommunitiesServiceError>;

    /// Retrieve a single community.
    async fn get_community(
        &self,
        community: CommunityUuid,
    ) -> Result<CommunityRecord, CommunitiesServiceError>;

    /// Creates a community and records who created it.
    async fn create_community(
        &self,
        actor: Actor,
        community: NewCommunity,
    ) -> Result<CommunityRecord, CommunitiesServiceError>;

    /// Applies a partial edit and records the before and after state.
    async fn update_community(
        &self,
        actor: Actor,
        community: CommunityUuid,
        update: CommunityUpdate,
    ) -> Result<CommunityRecord, CommunitiesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::communities::records::{BlockLayout, CommunityLayout, SubscriptionStatus},
        test::{TestContext, helpers::audit_entries},
    };

    use super::*;

    fn maple_court() -> NewCommunity {
        NewCommunity {
            name: "Maple Court".to_string(),
            location: "12 Elm Street".to_string(),
            subscription_plan: Some("standard".to_string()),
            subscription_status: SubscriptionStatus::Active,
            layout: CommunityLayout {
                blocks: vec![BlockLayout {
                    name: "A".to_string(),
                    floors: 3,
                    units_per_floor: 4,
                }],
            },
            total_members: 42,
            ..NewCommunity::default()
        }
    }

    #[tokio::test]
    async fn create_community_round_trips_all_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .communities
            .create_community(ctx.actor(), maple_court())
            .await?;

        let fetched = ctx.communities.get_community(created.uuid).await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Maple Court");
        assert_eq!(fetched.subscription_status, SubscriptionStatus::Active);
        assert_eq!(fetched.layout.total_units(), 12);
        assert_eq!(fetched.total_members, 42);

        Ok(())
    }

    #[tokio::test]
    async fn create_community_is_audited() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .communities
            .create_community(ctx.actor(), maple_court())
            .await?;

        let entries = audit_entries(&ctx, AuditAction::CreateCommunity).await?;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target_uuid, Some(created.uuid.into_uuid()));

        Ok(())
    }

    #[tokio::test]
    async fn create_community_rejects_blank_name_without_writing() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .communities
            .create_community(
                ctx.actor(),
                NewCommunity {
                    name: String::new(),
                    ..maple_court()
                },
            )
            .await;

        assert!(matches!(result, Err(CommunitiesServiceError::Validation(_))));
        assert!(ctx.communities.list_communities().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn get_community_returns_not_found_for_unknown_uuid() {
        let ctx = TestContext::new().await;

        let result = ctx.communities.get_community(CommunityUuid::new()).await;

        assert!(
            matches!(result, Err(CommunitiesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_communities_returns_newest_first() -> TestResult {
        let ctx = TestContext::new().await;

        for name in ["Older", "Newer"] {
            ctx.communities
                .create_community(
                    ctx.actor(),
                    NewCommunity {
                        name: name.to_string(),
                        ..maple_court()
                    },
                )
                .await?;
        }

        let names: Vec<_> = ctx
            .communities
            .list_communities()
            .await?
            .into_iter()
            .map(|community| community.name)
            .collect();

        assert_eq!(names, vec!["Newer", "Older"]);

        Ok(())
    }

    #[tokio::test]
    async fn update_community_changes_only_given_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .communities
            .create_community(ctx.actor(), maple_court())
            .await?;

        let updated = ctx
            .communities
            .update_community(
                ctx.actor(),
                created.uuid,
                CommunityUpdate {
                    name: Some("Maple Gardens".to_string()),
                    subscription_status: Some(SubscriptionStatus::Cancelled),
                    ..CommunityUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.uuid, created.uuid);
        assert_eq!(updated.name, "Maple Gardens");
        assert_eq!(updated.subscription_status, SubscriptionStatus::Cancelled);
        assert_eq!(updated.location, created.location);
        assert_eq!(updated.layout, created.layout);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        assert_eq!(ctx.communities.get_community(created.uuid).await?, updated);

        Ok(())
    }

    #[tokio::test]
    async fn update_community_is_audited_with_before_and_after() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .communities
            .create_community(ctx.actor(), maple_court())
            .await?;

        ctx.communities
            .update_community(
                ctx.actor(),
                created.uuid,
                CommunityUpdate {
                    total_members: Some(7),
                    ..CommunityUpdate::default()
                },
            )
            .await?;

        let entries = audit_entries(&ctx, AuditAction::UpdateCommunity).await?;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target_uuid, Some(created.uuid.into_uuid()));
        assert_eq!(entries[0].admin_uuid, Some(ctx.admin.uuid));

        let changes: serde_json::Value =
            sqlx::query_scalar("SELECT changes FROM admin_audit_logs WHERE uuid = $1")
                .bind(entries[0].uuid.into_uuid())
                .fetch_one(ctx.db.pool())
                .await?;

        assert_eq!(changes["before"]["totalMembers"], 42);
        assert_eq!(changes["after"]["totalMembers"], 7);

        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_community_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .communities
            .update_community(ctx.actor(), CommunityUuid::new(), CommunityUpdate::default())
            .await;

        assert!(
            matches!(result, Err(CommunitiesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn invalid_update_leaves_community_unchanged() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .communities
            .create_community(ctx.actor(), maple_court())
            .await?;

        let result = ctx
            .communities
            .update_community(
                ctx.actor(),
                created.uuid,
                CommunityUpdate {
                    name: Some(String::new()),
                    ..CommunityUpdate::default()
                },
            )
            .await;

        assert!(matches!(result, Err(CommunitiesServiceError::Validation(_))));
        assert_eq!(ctx.communities.get_community(created.uuid).await?, created);
        assert!(audit_entries(&ctx, AuditAction::UpdateCommunity).await?.is_empty());

        Ok(())
    }
}
