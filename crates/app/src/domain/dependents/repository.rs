//! Dependents Repository
//!
//! Table and field names come from the static [`DependentKind`] registry, so
//! statements are assembled once per kind rather than kept as SQL files.

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::domain::dependents::{documents::DependentDocument, kinds::DependentKind};

#[derive(Debug, Clone)]
struct KindStatements {
    select_owned: String,
    delete_owned: String,
    insert_many: String,
}

impl KindStatements {
    fn for_kind(kind: DependentKind) -> Self {
        let collection = kind.collection();
        let table = collection.table;

        // $1: community uuid as text, $2: extra uuids matched regardless of owner
        let owned = collection
            .reference_fields
            .iter()
            .map(|field| format!("document ->> '{field}' = $1"))
            .chain(std::iter::once("uuid = ANY($2)".to_string()))
            .collect::<Vec<_>>()
            .join(" OR ");

        Self {
            select_owned: format!(
                "SELECT uuid, document FROM {table} WHERE {owned} ORDER BY created_at, uuid"
            ),
            delete_owned: format!("DELETE FROM {table} WHERE {owned} RETURNING uuid, document"),
            insert_many: format!(
                "INSERT INTO {table} (uuid, document) \
                 SELECT (item ->> 'uuid')::uuid, item -> 'document' \
                 FROM jsonb_array_elements($1) AS item"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PgDependentsRepository {
    statements: BTreeMap<DependentKind, KindStatements>,
}

impl Default for PgDependentsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PgDependentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            statements: DependentKind::ALL
                .into_iter()
                .map(|kind| (kind, KindStatements::for_kind(kind)))
                .collect(),
        }
    }

    fn statements(&self, kind: DependentKind) -> Result<&KindStatements, sqlx::Error> {
        self.statements
            .get(&kind)
            .ok_or_else(|| sqlx::Error::Protocol(format!("no statements registered for {kind}")))
    }

    /// Documents of `kind` owned by `community`, plus any whose uuid is in `also`.
    pub(crate) async fn find_owned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        kind: DependentKind,
        community: Uuid,
        also: &[Uuid],
    ) -> Result<Vec<DependentDocument>, sqlx::Error> {
        query_as::<Postgres, DependentDocument>(&self.statements(kind)?.select_owned)
            .bind(community.to_string())
            .bind(also)
            .fetch_all(&mut **tx)
            .await
    }

    /// Delete what [`Self::find_owned`] would return, handing back the
    /// removed documents.
    pub(crate) async fn delete_owned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        kind: DependentKind,
        community: Uuid,
        also: &[Uuid],
    ) -> Result<Vec<DependentDocument>, sqlx::Error> {
        query_as::<Postgres, DependentDocument>(&self.statements(kind)?.delete_owned)
            .bind(community.to_string())
            .bind(also)
            .fetch_all(&mut **tx)
            .await
    }

    /// Insert documents in one statement, keeping their uuids.
    pub(crate) async fn insert_many(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        kind: DependentKind,
        documents: &[DependentDocument],
    ) -> Result<u64, sqlx::Error> {
        if documents.is_empty() {
            return Ok(0);
        }

        let result = query(&self.statements(kind)?.insert_many)
            .bind(Json(documents))
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

impl<'r> FromRow<'r, PgRow> for DependentDocument {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let Json(document) = row.try_get::<Json<Value>, _>("document")?;

        Ok(Self {
            uuid: row.try_get("uuid")?,
            document,
        })
    }
}
