//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        audit::{AuditLogService, PgAuditLogService},
        communities::{CommunitiesService, PgCommunitiesService},
        deletion::{CommunityDeletionService, PgCommunityDeletionService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub communities: Arc<dyn CommunitiesService>,
    pub deletions: Arc<dyn CommunityDeletionService>,
    pub audit_logs: Arc<dyn AuditLogService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, max_connections: u32) -> Result<Self, AppInitError> {
        let pool = database::connect_pool(url, max_connections)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool.clone());
        let audit_logs: Arc<dyn AuditLogService> = Arc::new(PgAuditLogService::new(pool.clone()));

        Ok(Self {
            communities: Arc::new(PgCommunitiesService::new(db.clone(), audit_logs.clone())),
            deletions: Arc::new(PgCommunityDeletionService::new(db, audit_logs.clone())),
            audit_logs,
            auth: Arc::new(PgAuthService::new(pool)),
        })
    }
}
