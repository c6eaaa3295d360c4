//! Audit Log Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as, types::Json};
use uuid::Uuid;

use crate::{
    auth::AdminUuid,
    domain::audit::{
        data::{ActivityFilter, AuditAction, NewAuditEntry},
        records::{AuditLogRecord, AuditLogUuid},
    },
};

const INSERT_AUDIT_LOG_SQL: &str = include_str!("sql/insert_audit_log.sql");
const LIST_AUDIT_LOGS_SQL: &str = include_str!("sql/list_audit_logs.sql");

/// Writes go straight to the pool so an entry never shares a transaction
/// with the action it describes.
#[derive(Debug, Clone)]
pub(crate) struct PgAuditLogsRepository {
    pool: PgPool,
}

impl PgAuditLogsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn insert_entry(
        &self,
        entry: NewAuditEntry,
    ) -> Result<AuditLogRecord, sqlx::Error> {
        let changes = entry.changes.map(|changes| {
            Json(serde_json::json!({
                "before": changes.before.unwrap_or(Value::Null),
                "after": changes.after.unwrap_or(Value::Null),
            }))
        });

        query_as::<Postgres, AuditLogRecord>(INSERT_AUDIT_LOG_SQL)
            .bind(AuditLogUuid::new().into_uuid())
            .bind(entry.admin_uuid.map(AdminUuid::into_uuid))
            .bind(entry.admin_email)
            .bind(entry.action.as_str())
            .bind(entry.target.kind.as_str())
            .bind(entry.target.uuid)
            .bind(entry.target.name)
            .bind(changes)
            .bind(entry.metadata.map(Json))
            .bind(entry.ip)
            .bind(entry.user_agent)
            .bind(entry.status.as_str())
            .bind(entry.error_message)
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn list_activity(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<AuditLogRecord>, sqlx::Error> {
        query_as::<Postgres, AuditLogRecord>(LIST_AUDIT_LOGS_SQL)
            .bind(filter.action.map(AuditAction::as_str))
            .bind(filter.since.map(SqlxTimestamp::from))
            .bind(filter.until.map(SqlxTimestamp::from))
            .bind(filter.limit.map(i64::from))
            .fetch_all(&self.pool)
            .await
    }
}

fn decode_error(index: &str, source: crate::domain::audit::AuditLogError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(source),
    }
}

impl<'r> FromRow<'r, PgRow> for AuditLogRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let action: String = row.try_get("action")?;
        let target_type: String = row.try_get("target_type")?;
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: AuditLogUuid::from_uuid(row.try_get("uuid")?),
            admin_uuid: row
                .try_get::<Option<Uuid>, _>("admin_uuid")?
                .map(AdminUuid::from_uuid),
            admin_email: row.try_get("admin_email")?,
            action: action.parse().map_err(|e| decode_error("action", e))?,
            target_type: target_type
                .parse()
                .map_err(|e| decode_error("target_type", e))?,
            target_uuid: row.try_get::<Option<Uuid>, _>("target_uuid")?,
            target_name: row.try_get("target_name")?,
            ip: row.try_get("ip")?,
            user_agent: row.try_get("user_agent")?,
            status: status.parse().map_err(|e| decode_error("status", e))?,
            error_message: row.try_get("error_message")?,
            metadata: row
                .try_get::<Option<Json<Value>>, _>("metadata")?
                .map(|Json(metadata)| metadata),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
