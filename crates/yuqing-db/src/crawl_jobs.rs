//! Database operations for `crawl_jobs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use yuqing_core::{CrawlJob, JobStatus};

use crate::DbError;

/// A row from the `crawl_jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CrawlJobRow {
    pub id: i64,
    pub task_id: i64,
    pub platform: String,
    pub status: String,
    pub total_collected: i32,
    pub newly_stored: i32,
    pub duplicates: i32,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CrawlJobRow {
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if the stored status is unknown.
    pub fn into_crawl_job(self) -> Result<CrawlJob, DbError> {
        let status = self
            .status
            .parse::<JobStatus>()
            .map_err(DbError::InvalidValue)?;
        Ok(CrawlJob {
            id: self.id,
            task_id: self.task_id,
            platform: self.platform,
            status,
            total_collected: self.total_collected,
            newly_stored: self.newly_stored,
            duplicates: self.duplicates,
            error_message: self.error_message,
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

const JOB_COLUMNS: &str = "id, task_id, platform, status, total_collected, newly_stored, \
                           duplicates, error_message, started_at, completed_at, created_at, updated_at";

/// Statuses a job must currently be in to move to `next`, plus the label
/// reported when it is not.
fn allowed_predecessors(next: JobStatus) -> (&'static [&'static str], &'static str) {
    match next {
        JobStatus::Pending => (&[], "none"),
        JobStatus::Running => (&["pending", "running"], "pending or running"),
        JobStatus::Completed | JobStatus::Failed => (&["running"], "running"),
    }
}

/// Creates a new crawl job in `pending` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_crawl_job(
    pool: &PgPool,
    task_id: i64,
    platform: &str,
) -> Result<CrawlJobRow, DbError> {
    let row = sqlx::query_as::<_, CrawlJobRow>(&format!(
        "INSERT INTO crawl_jobs (task_id, platform, status) \
         VALUES ($1, $2, 'pending') \
         RETURNING {JOB_COLUMNS}"
    ))
    .bind(task_id)
    .bind(platform)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Writes status, counters and timestamps from `job`.
///
/// Guarded by the lifecycle: `running` may follow `pending` or repeat to
/// flush counters; `completed` and `failed` require `running`. `started_at`
/// is set once and never overwritten.
///
/// # Errors
///
/// Returns [`DbError::InvalidCrawlJobTransition`] when the stored status does
/// not allow the update, or [`DbError::Sqlx`] if the update fails.
pub async fn update_crawl_job(pool: &PgPool, job: &CrawlJob) -> Result<(), DbError> {
    let (predecessors, expected_status) = allowed_predecessors(job.status);

    let result = sqlx::query(
        "UPDATE crawl_jobs \
         SET status = $2, total_collected = $3, newly_stored = $4, duplicates = $5, \
             error_message = $6, started_at = COALESCE(started_at, $7, NOW()), \
             completed_at = $8, updated_at = NOW() \
         WHERE id = $1 AND status = ANY($9)",
    )
    .bind(job.id)
    .bind(job.status.as_str())
    .bind(job.total_collected)
    .bind(job.newly_stored)
    .bind(job.duplicates)
    .bind(&job.error_message)
    .bind(job.started_at)
    .bind(job.completed_at)
    .bind(predecessors)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCrawlJobTransition {
            id: job.id,
            expected_status,
        });
    }

    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_crawl_job(pool: &PgPool, id: i64) -> Result<CrawlJobRow, DbError> {
    sqlx::query_as::<_, CrawlJobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM crawl_jobs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// The most recently updated job for a task.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_crawl_job(
    pool: &PgPool,
    task_id: i64,
) -> Result<Option<CrawlJobRow>, DbError> {
    let row = sqlx::query_as::<_, CrawlJobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM crawl_jobs \
         WHERE task_id = $1 \
         ORDER BY updated_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Jobs for a task, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_crawl_jobs(
    pool: &PgPool,
    task_id: i64,
    limit: i64,
) -> Result<Vec<CrawlJobRow>, DbError> {
    let rows = sqlx::query_as::<_, CrawlJobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM crawl_jobs \
         WHERE task_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(task_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
