//! Database connection management using sqlx

use crate::config::DatabaseConfig;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;

pub type DbPool = MySqlPool;

/// Build a lazily-connecting pool. No connection is attempted until the
/// first query, so a down database surfaces as a query error rather than a
/// startup failure.
pub fn init_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(30))
        .connect_lazy(&config.url())
}

/// Round-trip a trivial query to prove the pool can reach the server.
pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
