//! Backups Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::{
    auth::AdminUuid,
    domain::{
        backups::{
            data::{CommunitySnapshot, DeletionMetadata, NewBackup},
            records::{BackupRecord, BackupUuid},
        },
        communities::records::CommunityUuid,
        dependents::DependentCounts,
    },
};

const INSERT_BACKUP_SQL: &str = include_str!("sql/insert_backup.sql");
const GET_BACKUP_SQL: &str = include_str!("sql/get_backup.sql");
const LOCK_BACKUP_SQL: &str = include_str!("sql/lock_backup.sql");
const MARK_RESTORED_SQL: &str = include_str!("sql/mark_restored.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBackupsRepository;

impl PgBackupsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_backup(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        backup: &NewBackup,
    ) -> Result<BackupRecord, sqlx::Error> {
        query_as::<Postgres, BackupRecord>(INSERT_BACKUP_SQL)
            .bind(BackupUuid::new().into_uuid())
            .bind(backup.snapshot.community.uuid.into_uuid())
            .bind(Json(&backup.snapshot))
            .bind(backup.deletion.deleted_by.into_uuid())
            .bind(&backup.deletion.deleted_by_email)
            .bind(SqlxTimestamp::from(backup.deletion.deleted_at))
            .bind(&backup.deletion.reason)
            .bind(Json(&backup.deletion.counts))
            .bind(SqlxTimestamp::from(backup.permanent_delete_at()))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_backup(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        backup: BackupUuid,
    ) -> Result<BackupRecord, sqlx::Error> {
        query_as::<Postgres, BackupRecord>(GET_BACKUP_SQL)
            .bind(backup.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Load a backup and hold its row lock until the transaction ends.
    pub(crate) async fn lock_backup(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        backup: BackupUuid,
    ) -> Result<BackupRecord, sqlx::Error> {
        query_as::<Postgres, BackupRecord>(LOCK_BACKUP_SQL)
            .bind(backup.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Move a pending, unexpired backup to `restored`. Returns `false` when
    /// the backup was not in that state.
    pub(crate) async fn mark_restored(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        backup: BackupUuid,
        restored_by: AdminUuid,
        restored_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = query(MARK_RESTORED_SQL)
            .bind(backup.into_uuid())
            .bind(SqlxTimestamp::from(restored_at))
            .bind(restored_by.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

impl<'r> FromRow<'r, PgRow> for BackupRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(snapshot) = row.try_get::<Json<CommunitySnapshot>, _>("snapshot")?;
        let Json(counts) = row.try_get::<Json<DependentCounts>, _>("counts")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: BackupUuid::from_uuid(row.try_get("uuid")?),
            original_community_uuid: CommunityUuid::from_uuid(
                row.try_get("original_community_uuid")?,
            ),
            snapshot,
            deletion: DeletionMetadata {
                deleted_by: AdminUuid::from_uuid(row.try_get("deleted_by")?),
                deleted_by_email: row.try_get("deleted_by_email")?,
                deleted_at: row.try_get::<SqlxTimestamp, _>("deleted_at")?.to_jiff(),
                reason: row.try_get("reason")?,
                counts,
            },
            permanent_delete_at: row
                .try_get::<SqlxTimestamp, _>("permanent_delete_at")?
                .to_jiff(),
            status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?,
            restored_at: row
                .try_get::<Option<SqlxTimestamp>, _>("restored_at")?
                .map(|ts| ts.to_jiff()),
            restored_by: row
                .try_get::<Option<Uuid>, _>("restored_by")?
                .map(AdminUuid::from_uuid),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
