//! Communities Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, types::Json};

use crate::domain::communities::{
    data::NewCommunity,
    records::{CommunityLayout, CommunityRecord, CommunityUuid},
};

const LIST_COMMUNITIES_SQL: &str = include_str!("sql/list_communities.sql");
const GET_COMMUNITY_SQL: &str = include_str!("sql/get_community.sql");
const INSERT_COMMUNITY_SQL: &str = include_str!("sql/insert_community.sql");
const LOCK_COMMUNITY_SQL: &str = include_str!("sql/lock_community.sql");
const UPDATE_COMMUNITY_SQL: &str = include_str!("sql/update_community.sql");
const DELETE_COMMUNITY_SQL: &str = include_str!("sql/delete_community.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCommunitiesRepository;

impl PgCommunitiesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_communities(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CommunityRecord>, sqlx::Error> {
        query_as::<Postgres, CommunityRecord>(LIST_COMMUNITIES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_community(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        community: CommunityUuid,
    ) -> Result<CommunityRecord, sqlx::Error> {
        query_as::<Postgres, CommunityRecord>(GET_COMMUNITY_SQL)
            .bind(community.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Insert a community. `created_at` is supplied so restored communities
    /// keep their original creation time.
    pub(crate) async fn insert_community(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CommunityUuid,
        community: &NewCommunity,
        created_at: Timestamp,
    ) -> Result<CommunityRecord, sqlx::Error> {
        let total_members = stored_member_count(community.total_members)?;

        query_as::<Postgres, CommunityRecord>(INSERT_COMMUNITY_SQL)
            .bind(uuid.into_uuid())
            .bind(&community.name)
            .bind(&community.location)
            .bind(community.subscription_plan.as_deref())
            .bind(community.subscription_status.as_str())
            .bind(community.plan_starts_at.map(SqlxTimestamp::from))
            .bind(community.plan_ends_at.map(SqlxTimestamp::from))
            .bind(Json(&community.layout))
            .bind(total_members)
            .bind(SqlxTimestamp::from(created_at))
            .bind(SqlxTimestamp::from(Timestamp::now()))
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch a community and hold its row lock until the transaction ends.
    pub(crate) async fn lock_community(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        community: CommunityUuid,
    ) -> Result<CommunityRecord, sqlx::Error> {
        query_as::<Postgres, CommunityRecord>(LOCK_COMMUNITY_SQL)
            .bind(community.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Overwrite every editable column and bump `updated_at`.
    pub(crate) async fn update_community(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: CommunityUuid,
        community: &NewCommunity,
        updated_at: Timestamp,
    ) -> Result<CommunityRecord, sqlx::Error> {
        let total_members = stored_member_count(community.total_members)?;

        query_as::<Postgres, CommunityRecord>(UPDATE_COMMUNITY_SQL)
            .bind(uuid.into_uuid())
            .bind(&community.name)
            .bind(&community.location)
            .bind(community.subscription_plan.as_deref())
            .bind(community.subscription_status.as_str())
            .bind(community.plan_starts_at.map(SqlxTimestamp::from))
            .bind(community.plan_ends_at.map(SqlxTimestamp::from))
            .bind(Json(&community.layout))
            .bind(total_members)
            .bind(SqlxTimestamp::from(updated_at))
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a community, returning the row as it was. `None` when no row
    /// matched.
    pub(crate) async fn delete_community(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        community: CommunityUuid,
    ) -> Result<Option<CommunityRecord>, sqlx::Error> {
        query_as::<Postgres, CommunityRecord>(DELETE_COMMUNITY_SQL)
            .bind(community.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

fn stored_member_count(total_members: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(total_members).map_err(|e| sqlx::Error::ColumnDecode {
        index: "total_members".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for CommunityRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("subscription_status")?;
        let total_members: i64 = row.try_get("total_members")?;
        let Json(layout) = row.try_get::<Json<CommunityLayout>, _>("layout")?;

        Ok(Self {
            uuid: CommunityUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            subscription_plan: row.try_get("subscription_plan")?,
            subscription_status: status.parse().map_err(|e| sqlx::Error::ColumnDecode {
                index: "subscription_status".to_string(),
                source: Box::new(e),
            })?,
            plan_starts_at: row
                .try_get::<Option<SqlxTimestamp>, _>("plan_starts_at")?
                .map(|ts| ts.to_jiff()),
            plan_ends_at: row
                .try_get::<Option<SqlxTimestamp>, _>("plan_ends_at")?
                .map(|ts| ts.to_jiff()),
            layout,
            total_members: u64::try_from(total_members).map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "total_members".to_string(),
                    source: Box::new(e),
                }
            })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
