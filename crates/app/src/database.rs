//! Database connection management

use sqlx::{
    PgPool, Postgres, Transaction, migrate::MigrateError, postgres::PgPoolOptions, query,
};
use uuid::Uuid;

pub use sqlx::Error as DatabaseError;

/// Takes a transaction-scoped advisory lock; released on commit or rollback.
const ADVISORY_XACT_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock($1)";

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired or the transaction cannot start.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Begin a transaction holding the advisory lock for `key`.
    ///
    /// Concurrent callers using the same key are serialised until the holder
    /// commits or rolls back.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or taking the lock fails.
    pub async fn begin_locked_transaction(
        &self,
        key: Uuid,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        query(ADVISORY_XACT_LOCK_SQL)
            .bind(advisory_lock_key(key))
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Fold a uuid into the signed 64-bit key space used by Postgres advisory locks.
#[must_use]
pub fn advisory_lock_key(key: Uuid) -> i64 {
    let (high, low) = key.as_u64_pair();

    i64::from_be_bytes((high ^ low).to_be_bytes())
}

/// Connect to `PostgreSQL` with the driver's default pool size.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Connect a pool capped at `max_connections`. A delete holds one
/// connection for its whole transaction, so size this above the expected
/// number of concurrent deletes and restores.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
