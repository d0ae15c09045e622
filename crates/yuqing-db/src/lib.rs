//! Postgres persistence for monitoring tasks, collected items, analyses,
//! crawl jobs and daily sentiment statistics.

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use yuqing_core::AppConfig;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Pool sizing. Defaults match the `YUQING_DB_*` config defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    #[error("crawl job {id} is not in expected status '{expected_status}'")]
    InvalidCrawlJobTransition {
        id: i64,
        expected_status: &'static str,
    },
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// `true` when a unique constraint rejected the write.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::Sqlx(sqlx::Error::Database(e)) if e.is_unique_violation())
    }
}

/// # Errors
///
/// Returns [`sqlx::Error`] if no connection can be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await
}

/// Opens the pool described by `DATABASE_URL` and the `YUQING_DB_*` settings.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if no connection can be established.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    let pool = connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    tracing::debug!(
        max_connections = config.db_max_connections,
        "database pool ready"
    );
    Ok(pool)
}

/// Applies pending migrations and returns how many ran.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // The bookkeeping table is missing on a fresh database; count that as zero.
    let applied_before = applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let applied_after = applied_migrations(pool).await;

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Round-trips `SELECT 1` through the pool.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}


pub mod analysis;
pub mod crawl_jobs;
pub mod items;
pub mod seed;
pub mod stats;
pub mod store;
pub mod tasks;

pub use analysis::{get_analysis, upsert_analysis, AnalysisRow};
pub use crawl_jobs::{
    create_crawl_job, get_crawl_job, get_latest_crawl_job, list_crawl_jobs, update_crawl_job,
    CrawlJobRow,
};
pub use items::{
    count_items_by_task, insert_item, item_exists, list_items_by_task, AnalyzedItemRow, ItemInsert,
};
pub use seed::seed_tasks;
pub use stats::{
    aggregate_sentiment_stats, get_task_progress, list_sentiment_stats,
    list_sentiment_stats_between, progress_percent,
    SentimentStatRow, TaskProgress,
};
pub use store::PgStore;
pub use tasks::{
    create_task, get_task, list_active_tasks, list_tasks, set_task_status, TaskRow,
};
