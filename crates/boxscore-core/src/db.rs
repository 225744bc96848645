use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::debug;

pub type DbPool = Pool<Postgres>;

/// Which database a pool points at, used in logs and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbRole {
    /// Upstream statistics database the row sources read from.
    Source,
    /// Database receiving the aggregate tables.
    Target,
}

impl DbRole {
    fn as_str(&self) -> &'static str {
        match self {
            DbRole::Source => "source",
            DbRole::Target => "target",
        }
    }
}

/// Opens a small pool; a run only ever holds one connection per role at a time.
pub async fn connect(database_url: &str, role: DbRole) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .with_context(|| format!("failed to connect to the {} database", role.as_str()))?;
    debug!(role = role.as_str(), "Connected to Postgres");
    Ok(pool)
}

/// Creates the aggregate tables embedded at compile time.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .with_context(|| "failed to apply aggregate table migrations")
}
