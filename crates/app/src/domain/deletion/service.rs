//! Community deletion service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde_json::json;

use crate::{
    database::Db,
    domain::{
        audit::{
            AuditLogService,
            data::{Actor, AuditAction, NewAuditEntry},
            record_after_commit,
        },
        backups::{
            BackupRecord, BackupUuid, RestoreBlocked,
            data::{DeletionMetadata, NewBackup},
            repository::PgBackupsRepository,
        },
        communities::records::CommunityUuid,
        deletion::{
            cascade::CascadeDeleter,
            data::{DeletePreview, DeletedCommunity, RestoredCommunity},
            errors::DeletionServiceError,
            restore::RestorationEngine,
            snapshot::SnapshotCollector,
        },
    },
};

#[derive(Clone)]
pub struct PgCommunityDeletionService {
    db: Db,
    collector: SnapshotCollector,
    cascade: CascadeDeleter,
    restorer: RestorationEngine,
    backups: PgBackupsRepository,
    audit: Arc<dyn AuditLogService>,
}

impl fmt::Debug for PgCommunityDeletionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgCommunityDeletionService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgCommunityDeletionService {
    #[must_use]
    pub fn new(db: Db, audit: Arc<dyn AuditLogService>) -> Self {
        Self {
            db,
            collector: SnapshotCollector::new(),
            cascade: CascadeDeleter::new(),
            restorer: RestorationEngine::new(),
            backups: PgBackupsRepository::new(),
            audit,
        }
    }
}

fn backup_lookup(error: sqlx::Error) -> DeletionServiceError {
    match error {
        sqlx::Error::RowNotFound => DeletionServiceError::BackupNotFound,
        other => other.into(),
    }
}

#[async_trait]
impl CommunityDeletionService for PgCommunityDeletionService {
    async fn delete_preview(
        &self,
        community: CommunityUuid,
    ) -> Result<DeletePreview, DeletionServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let snapshot = self.collector.collect(&mut tx, community).await?;

        tx.commit().await?;

        Ok(DeletePreview {
            counts: snapshot.counts(),
            community: snapshot.community,
        })
    }

    async fn delete_community(
        &self,
        actor: Actor,
        community: CommunityUuid,
        reason: Option<String>,
    ) -> Result<DeletedCommunity, DeletionServiceError> {
        let mut tx = self.db.begin_locked_transaction(community.into_uuid()).await?;

        let loaded = self.collector.community(&mut tx, community).await?;

        let snapshot = self
            .cascade
            .delete(&mut tx, community)
            .await?
            .into_snapshot(loaded);

        let deleted = snapshot.counts();

        let new_backup = NewBackup {
            deletion: DeletionMetadata {
                deleted_by: actor.admin_uuid,
                deleted_by_email: actor.email.clone(),
                deleted_at: Timestamp::now(),
                reason: DeletionMetadata::normalise_reason(reason),
                counts: deleted.clone(),
            },
            snapshot,
        };

        let backup = self.backups.create_backup(&mut tx, &new_backup).await?;

        tracing::info!(
            %community,
            backup = %backup.uuid,
            records = deleted.total(),
            "created deletion backup"
        );

        tx.commit().await?;

        let record = new_backup.snapshot.community;

        tracing::info!(
            %community,
            name = %record.name,
            backup = %backup.uuid,
            "community deleted"
        );

        let entry = NewAuditEntry::community(
            actor,
            AuditAction::DeleteCommunity,
            community.into_uuid(),
            record.name.clone(),
        )
        .with_changes(
            Some(json!({ "name": record.name, "location": record.location })),
            None,
        )
        .with_metadata(json!({
            "backupId": backup.uuid,
            "deletedCounts": deleted,
            "reason": backup.deletion.reason,
            "canRestoreUntil": backup.permanent_delete_at,
        }));

        record_after_commit(self.audit.as_ref(), entry).await;

        Ok(DeletedCommunity {
            community: record,
            backup: backup.uuid,
            can_restore_until: backup.permanent_delete_at,
            deleted,
        })
    }

    async fn restore_community(
        &self,
        actor: Actor,
        backup: BackupUuid,
    ) -> Result<RestoredCommunity, DeletionServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .backups
            .lock_backup(&mut tx, backup)
            .await
            .map_err(backup_lookup)?;

        let now = Timestamp::now();

        record.ensure_restorable(now)?;

        let (community, restored) = self.restorer.restore(&mut tx, &record.snapshot).await?;

        if !self
            .backups
            .mark_restored(&mut tx, backup, actor.admin_uuid, now)
            .await?
        {
            return Err(RestoreBlocked::AlreadyRestored.into());
        }

        tx.commit().await?;

        tracing::info!(
            backup = %backup,
            original = %record.original_community_uuid,
            community = %community.uuid,
            records = restored.total(),
            "community restored"
        );

        let entry = NewAuditEntry::community(
            actor,
            AuditAction::RestoreCommunity,
            community.uuid.into_uuid(),
            community.name.clone(),
        )
        .with_metadata(json!({
            "backupId": backup,
            "originalCommunityId": record.original_community_uuid,
            "restoredCounts": restored,
        }));

        record_after_commit(self.audit.as_ref(), entry).await;

        Ok(RestoredCommunity {
            community,
            backup,
            restored,
        })
    }

    async fn get_backup(&self, backup: BackupUuid) -> Result<BackupRecord, DeletionServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .backups
            .get_backup(&mut tx, backup)
            .await
            .map_err(backup_lookup)?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait CommunityDeletionService: Send + Sync {
    /// Counts of what a delete would remove, without changing anything.
    async fn delete_preview(
        &self,
        community: CommunityUuid,
    ) -> Result<DeletePreview, DeletionServiceError>;

    /// Back up and remove a community with everything it owns.
    async fn delete_community(
        &self,
        actor: Actor,
        community: CommunityUuid,
        reason: Option<String>,
    ) -> Result<DeletedCommunity, DeletionServiceError>;

    /// Re-create a deleted community from its backup.
    async fn restore_community(
        &self,
        actor: Actor,
        backup: BackupUuid,
    ) -> Result<RestoredCommunity, DeletionServiceError>;

    /// Retrieve a single backup.
    async fn get_backup(&self, backup: BackupUuid) -> Result<BackupRecord, DeletionServiceError>;
}
