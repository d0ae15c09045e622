//! Database operations for `monitoring_tasks`.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use yuqing_core::{MonitoringTask, TaskStatus};

use crate::DbError;

/// A row from the `monitoring_tasks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub keyword: String,
    pub description: Option<String>,
    pub platforms: Json<Vec<String>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    #[must_use]
    pub fn to_monitoring_task(&self) -> MonitoringTask {
        MonitoringTask {
            id: self.id,
            keyword: self.keyword.clone(),
            platforms: self.platforms.0.clone(),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TaskStatus::Active.as_str()
    }
}

const TASK_COLUMNS: &str =
    "id, keyword, description, platforms, status, created_at, updated_at";

/// Inserts a new `active` task.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; a keyword that already
/// exists (case-insensitively) is reported as a unique violation.
pub async fn create_task(
    pool: &PgPool,
    keyword: &str,
    description: Option<&str>,
    platforms: &[String],
) -> Result<TaskRow, DbError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "INSERT INTO monitoring_tasks (keyword, description, platforms) \
         VALUES ($1, $2, $3) \
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(keyword)
    .bind(description)
    .bind(Json(platforms))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_task(pool: &PgPool, id: i64) -> Result<Option<TaskRow>, DbError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM monitoring_tasks WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Lists tasks newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tasks(
    pool: &PgPool,
    status: Option<TaskStatus>,
    limit: i64,
) -> Result<Vec<TaskRow>, DbError> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM monitoring_tasks \
         WHERE ($1::TEXT IS NULL OR status = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(status.map(TaskStatus::as_str))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// All `active` tasks, oldest first, for scheduled collection.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_tasks(pool: &PgPool) -> Result<Vec<TaskRow>, DbError> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM monitoring_tasks \
         WHERE status = 'active' \
         ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no task has this `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_task_status(pool: &PgPool, id: i64, status: TaskStatus) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE monitoring_tasks SET status = $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(status.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
