//! Database operations for `sentiment_analysis`.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use yuqing_core::{AnalysisResult, Keyword};

use crate::DbError;

/// A row from the `sentiment_analysis` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRow {
    pub id: i64,
    pub item_id: i64,
    pub sentiment: String,
    pub score: Decimal,
    pub confidence: Decimal,
    pub keywords: Json<Vec<Keyword>>,
    pub analyzed_at: DateTime<Utc>,
}

/// `score` and `confidence` live in `NUMERIC(5,4)` columns.
fn to_numeric(field: &str, value: f64) -> Result<Decimal, DbError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(4))
        .ok_or_else(|| DbError::InvalidValue(format!("{field} {value} is not representable")))
}

/// Insert the analysis for an item, replacing any previous one.
///
/// # Errors
///
/// Returns [`DbError::InvalidValue`] for a non-finite score, or
/// [`DbError::Sqlx`] if the upsert fails (including a missing item).
pub async fn upsert_analysis(pool: &PgPool, analysis: &AnalysisResult) -> Result<i64, DbError> {
    let score = to_numeric("score", analysis.score)?;
    let confidence = to_numeric("confidence", analysis.confidence)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sentiment_analysis (item_id, sentiment, score, confidence, keywords) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (item_id) DO UPDATE SET \
             sentiment = EXCLUDED.sentiment, \
             score = EXCLUDED.score, \
             confidence = EXCLUDED.confidence, \
             keywords = EXCLUDED.keywords, \
             analyzed_at = NOW() \
         RETURNING id",
    )
    .bind(analysis.item_id)
    .bind(analysis.sentiment.as_str())
    .bind(score)
    .bind(confidence)
    .bind(Json(&analysis.keywords))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_analysis(pool: &PgPool, item_id: i64) -> Result<Option<AnalysisRow>, DbError> {
    let row = sqlx::query_as::<_, AnalysisRow>(
        "SELECT id, item_id, sentiment, score, confidence, keywords, analyzed_at \
         FROM sentiment_analysis \
         WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
