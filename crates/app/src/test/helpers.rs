//! Test Helpers

use serde_json::Value;
use sqlx::{Postgres, query_as};
use uuid::Uuid;

use crate::{
    domain::{
        audit::{
            AuditLogError, AuditLogService,
            data::{ActivityFilter, AuditAction},
            records::AuditLogRecord,
        },
        communities::{
            CommunitiesService, CommunitiesServiceError,
            data::NewCommunity,
            records::{BlockLayout, CommunityLayout, CommunityRecord},
        },
        dependents::{DependentDocument, DependentKind},
    },
    test::TestContext,
};

/// Create a community with a two-block layout through the service.
pub(crate) async fn create_community(
    ctx: &TestContext,
    name: &str,
) -> Result<CommunityRecord, CommunitiesServiceError> {
    ctx.communities
        .create_community(
            ctx.actor(),
            NewCommunity {
                name: name.to_string(),
                location: "12 Harbour Road".to_string(),
                subscription_plan: Some("standard".to_string()),
                layout: CommunityLayout {
                    blocks: vec![
                        BlockLayout {
                            name: "A".to_string(),
                            floors: 4,
                            units_per_floor: 6,
                        },
                        BlockLayout {
                            name: "B".to_string(),
                            floors: 2,
                            units_per_floor: 3,
                        },
                    ],
                },
                total_members: 30,
                ..NewCommunity::default()
            },
        )
        .await
}

/// Insert a dependent document under a fresh uuid.
pub(crate) async fn seed_dependent(
    ctx: &TestContext,
    kind: DependentKind,
    document: Value,
) -> Result<Uuid, sqlx::Error> {
    let uuid = Uuid::now_v7();

    ctx.insert_dependent(kind, uuid, document).await?;

    Ok(uuid)
}

/// Every document currently stored for `kind`, oldest first.
pub(crate) async fn dependent_documents(
    ctx: &TestContext,
    kind: DependentKind,
) -> Result<Vec<DependentDocument>, sqlx::Error> {
    let sql = format!(
        "SELECT uuid, document FROM {} ORDER BY created_at, uuid",
        kind.collection().table
    );

    query_as::<Postgres, DependentDocument>(&sql)
        .fetch_all(ctx.db.pool())
        .await
}

/// Audit entries recorded for `action`, newest first.
pub(crate) async fn audit_entries(
    ctx: &TestContext,
    action: AuditAction,
) -> Result<Vec<AuditLogRecord>, AuditLogError> {
    ctx.audit
        .list_activity(ActivityFilter {
            action: Some(action),
            ..ActivityFilter::default()
        })
        .await
}
