use sqlx::types::Json;
use sqlx::PgPool;
use yuqing_core::TaskConfig;

use crate::DbError;

/// Upsert monitoring tasks from the seed file, matching on keyword
/// (case-insensitive).
///
/// Returns the number of tasks processed. All upserts run inside a single
/// transaction; if any operation fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_tasks(pool: &PgPool, tasks: &[TaskConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for task in tasks {
        sqlx::query(
            "INSERT INTO monitoring_tasks (keyword, description, platforms, status) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ((LOWER(keyword))) DO UPDATE SET \
                 description = EXCLUDED.description, \
                 platforms = EXCLUDED.platforms, \
                 status = EXCLUDED.status, \
                 updated_at = NOW()",
        )
        .bind(task.keyword.trim())
        .bind(&task.description)
        .bind(Json(&task.platforms))
        .bind(task.status.as_str())
        .execute(&mut *tx)
        .await?;

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
