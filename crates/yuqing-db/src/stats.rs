//! Daily sentiment statistics and collection progress.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::{count_items_by_task, get_latest_crawl_job, DbError};

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SentimentStatRow {
    pub id: i64,
    pub task_id: i64,
    pub stat_date: NaiveDate,
    pub positive_count: i32,
    pub neutral_count: i32,
    pub negative_count: i32,
    pub avg_score: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Collection progress for a task, derived from its latest crawl job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskProgress {
    pub task_id: i64,
    /// Status of the latest crawl job, or `idle` when the task has none.
    pub status: String,
    pub total_items: i64,
    pub collected: i32,
    pub stored: i32,
    pub duplicates: i32,
    pub progress: i32,
}

/// `(stored + duplicates) / collected` as a whole percentage, rounded half
/// up. Zero when nothing was collected.
#[must_use]
pub fn progress_percent(collected: i32, stored: i32, duplicates: i32) -> i32 {
    if collected <= 0 {
        return 0;
    }
    let done = i64::from(stored.max(0)) + i64::from(duplicates.max(0));
    let collected = i64::from(collected);
    let percent = (done * 200 + collected) / (collected * 2);
    i32::try_from(percent).unwrap_or(i32::MAX)
}

/// Recomputes per-day sentiment counts and average score for a task.
///
/// Items are bucketed by the UTC date they were published, falling back to
/// when they were collected. Returns the number of days written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn aggregate_sentiment_stats(pool: &PgPool, task_id: i64) -> Result<u64, DbError> {
    let result = sqlx::query(
        "INSERT INTO sentiment_stats \
             (task_id, stat_date, positive_count, neutral_count, negative_count, avg_score) \
         SELECT ci.task_id, \
                (COALESCE(ci.published_at, ci.collected_at) AT TIME ZONE 'UTC')::date AS stat_date, \
                COUNT(*) FILTER (WHERE sa.sentiment = 'positive')::INTEGER, \
                COUNT(*) FILTER (WHERE sa.sentiment = 'neutral')::INTEGER, \
                COUNT(*) FILTER (WHERE sa.sentiment = 'negative')::INTEGER, \
                ROUND(AVG(sa.score), 4) \
         FROM collected_items ci \
         JOIN sentiment_analysis sa ON sa.item_id = ci.id \
         WHERE ci.task_id = $1 \
         GROUP BY ci.task_id, stat_date \
         ON CONFLICT (task_id, stat_date) DO UPDATE SET \
             positive_count = EXCLUDED.positive_count, \
             neutral_count = EXCLUDED.neutral_count, \
             negative_count = EXCLUDED.negative_count, \
             avg_score = EXCLUDED.avg_score, \
             updated_at = NOW()",
    )
    .bind(task_id)
    .execute(pool)
    .await?;

    let days = result.rows_affected();
    tracing::debug!(task_id, days, "sentiment stats aggregated");
    Ok(days)
}

/// Most recent `days` rows for a task, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sentiment_stats(
    pool: &PgPool,
    task_id: i64,
    days: i64,
) -> Result<Vec<SentimentStatRow>, DbError> {
    let rows = sqlx::query_as::<_, SentimentStatRow>(
        "SELECT id, task_id, stat_date, positive_count, neutral_count, negative_count, \
                avg_score, created_at, updated_at \
         FROM sentiment_stats \
         WHERE task_id = $1 \
         ORDER BY stat_date DESC \
         LIMIT $2",
    )
    .bind(task_id)
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Rows with `from <= stat_date <= to`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sentiment_stats_between(
    pool: &PgPool,
    task_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<SentimentStatRow>, DbError> {
    let rows = sqlx::query_as::<_, SentimentStatRow>(
        "SELECT id, task_id, stat_date, positive_count, neutral_count, negative_count, \
                avg_score, created_at, updated_at \
         FROM sentiment_stats \
         WHERE task_id = $1 AND stat_date BETWEEN $2 AND $3 \
         ORDER BY stat_date",
    )
    .bind(task_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn get_task_progress(pool: &PgPool, task_id: i64) -> Result<TaskProgress, DbError> {
    let total_items = count_items_by_task(pool, task_id).await?;
    let latest = get_latest_crawl_job(pool, task_id).await?;

    let progress = match latest {
        Some(job) => TaskProgress {
            task_id,
            progress: progress_percent(job.total_collected, job.newly_stored, job.duplicates),
            status: job.status,
            total_items,
            collected: job.total_collected,
            stored: job.newly_stored,
            duplicates: job.duplicates,
        },
        None => TaskProgress {
            task_id,
            status: "idle".to_string(),
            total_items,
            collected: 0,
            stored: 0,
            duplicates: 0,
            progress: 0,
        },
    };

    Ok(progress)
}
