//! Database operations for `collected_items`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use yuqing_core::{Keyword, RawItem};

use crate::DbError;

/// Result of [`insert_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemInsert {
    pub id: i64,
    pub is_new: bool,
}

/// Inserts the item, or resolves to the row already holding its
/// `(platform, platform_id)`.
///
/// The insert and the uniqueness check are one statement, so concurrent
/// callers never create two rows for the same pair.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the conflicting row vanished before it
/// could be read back, or [`DbError::Sqlx`] if a query fails.
pub async fn insert_item(pool: &PgPool, task_id: i64, item: &RawItem) -> Result<ItemInsert, DbError> {
    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO collected_items \
             (task_id, platform, platform_id, author, author_id, content, url, \
              published_at, likes, replies, shares) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (platform, platform_id) DO NOTHING \
         RETURNING id",
    )
    .bind(task_id)
    .bind(&item.platform)
    .bind(&item.platform_id)
    .bind(&item.author)
    .bind(&item.author_id)
    .bind(&item.content)
    .bind(&item.url)
    .bind(item.published_at)
    .bind(item.likes)
    .bind(item.replies)
    .bind(item.shares)
    .fetch_optional(pool)
    .await?;

    if let Some(id) = inserted {
        return Ok(ItemInsert { id, is_new: true });
    }

    let existing: i64 = sqlx::query_scalar(
        "SELECT id FROM collected_items WHERE platform = $1 AND platform_id = $2",
    )
    .bind(&item.platform)
    .bind(&item.platform_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(ItemInsert {
        id: existing,
        is_new: false,
    })
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn item_exists(pool: &PgPool, platform: &str, platform_id: &str) -> Result<bool, DbError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM collected_items WHERE platform = $1 AND platform_id = $2)",
    )
    .bind(platform)
    .bind(platform_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_items_by_task(pool: &PgPool, task_id: i64) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM collected_items WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// A stored item joined with its analysis, if it has one.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalyzedItemRow {
    pub id: i64,
    pub task_id: i64,
    pub platform: String,
    pub platform_id: String,
    pub author: Option<String>,
    pub content: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub likes: i32,
    pub replies: i32,
    pub shares: i32,
    pub collected_at: DateTime<Utc>,
    pub sentiment: Option<String>,
    pub score: Option<Decimal>,
    pub confidence: Option<Decimal>,
    pub keywords: Option<Json<Vec<Keyword>>>,
}

/// A page of a task's items, newest publication first. Items without a
/// publication time sort last.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_items_by_task(
    pool: &PgPool,
    task_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<AnalyzedItemRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalyzedItemRow>(
        "SELECT i.id, i.task_id, i.platform, i.platform_id, i.author, i.content, i.url, \
                i.published_at, i.likes, i.replies, i.shares, i.collected_at, \
                a.sentiment, a.score, a.confidence, a.keywords \
         FROM collected_items i \
         LEFT JOIN sentiment_analysis a ON a.item_id = i.id \
         WHERE i.task_id = $1 \
         ORDER BY i.published_at DESC NULLS LAST, i.id DESC \
         LIMIT $2 OFFSET $3",
    )
    .bind(task_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
