//! Monitoring task handlers: CRUD-lite, start/stop, items, jobs, progress, stats.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use yuqing_core::{Keyword, TaskStatus};
use yuqing_db::{AnalyzedItemRow, CrawlJobRow, SentimentStatRow, TaskRow};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListTasksQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `from`/`to` select an inclusive date range and take precedence over `days`.
#[derive(Debug, Deserialize)]
pub(in crate::api) struct StatsQuery {
    pub days: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateTaskRequest {
    pub keyword: String,
    pub description: Option<String>,
    pub platforms: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct TaskItem {
    pub id: i64,
    pub keyword: String,
    pub description: Option<String>,
    pub platforms: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TaskRow> for TaskItem {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            keyword: row.keyword,
            description: row.description,
            platforms: row.platforms.0,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct JobItem {
    pub id: i64,
    pub platform: String,
    pub status: String,
    pub total_collected: i32,
    pub newly_stored: i32,
    pub duplicates: i32,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<CrawlJobRow> for JobItem {
    fn from(row: CrawlJobRow) -> Self {
        Self {
            id: row.id,
            platform: row.platform,
            status: row.status,
            total_collected: row.total_collected,
            newly_stored: row.newly_stored,
            duplicates: row.duplicates,
            error_message: row.error_message,
            started_at: row.started_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct StatItem {
    pub date: NaiveDate,
    pub positive: i32,
    pub neutral: i32,
    pub negative: i32,
    pub avg_score: Option<Decimal>,
}

impl From<SentimentStatRow> for StatItem {
    fn from(row: SentimentStatRow) -> Self {
        Self {
            date: row.stat_date,
            positive: row.positive_count,
            neutral: row.neutral_count,
            negative: row.negative_count,
            avg_score: row.avg_score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ItemAnalysis {
    pub sentiment: String,
    pub score: Option<Decimal>,
    pub confidence: Option<Decimal>,
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CollectedItem {
    pub id: i64,
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
    /// `null` until the item has been analyzed.
    pub analysis: Option<ItemAnalysis>,
}

impl From<AnalyzedItemRow> for CollectedItem {
    fn from(row: AnalyzedItemRow) -> Self {
        let analysis = row.sentiment.map(|sentiment| ItemAnalysis {
            sentiment,
            score: row.score,
            confidence: row.confidence,
            keywords: row.keywords.map(|k| k.0).unwrap_or_default(),
        });
        Self {
            id: row.id,
            platform: row.platform,
            platform_id: row.platform_id,
            author: row.author,
            content: row.content,
            url: row.url,
            published_at: row.published_at,
            likes: row.likes,
            replies: row.replies,
            shares: row.shares,
            collected_at: row.collected_at,
            analysis,
        }
    }
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ItemPage {
    pub total: i64,
    pub items: Vec<CollectedItem>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct StartedCollection {
    pub task_id: i64,
    pub status: &'static str,
    pub platforms: Vec<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_create(req_id: &str, body: &CreateTaskRequest) -> Result<(), ApiError> {
    let keyword = body.keyword.trim();
    if keyword.is_empty() || keyword.chars().count() > 100 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "keyword must be 1-100 characters",
        ));
    }
    if body.platforms.is_empty() {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "platforms must not be empty",
        ));
    }
    if body.platforms.iter().any(|p| p.trim().is_empty()) {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "platform names must not be blank",
        ));
    }
    Ok(())
}

async fn load_task(state: &AppState, req_id: &str, id: i64) -> Result<TaskRow, ApiError> {
    yuqing_db::get_task(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &e))?
        .ok_or_else(|| ApiError::new(req_id, "not_found", format!("task {id} not found")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks
pub(in crate::api) async fn list_tasks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<ApiResponse<Vec<TaskItem>>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<TaskStatus>)
        .transpose()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e))?;

    let rows = yuqing_db::list_tasks(&state.pool, status, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = rows.into_iter().map(TaskItem::from).collect();
    Ok(Json(ApiResponse::new(&req_id, items)))
}

/// POST /api/v1/tasks
pub(in crate::api) async fn create_task(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaskItem>>), ApiError> {
    let rid = &req_id.0;
    validate_create(rid, &body)?;

    let platforms: Vec<String> = body.platforms.iter().map(|p| p.trim().to_owned()).collect();
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let row = yuqing_db::create_task(&state.pool, body.keyword.trim(), description, &platforms)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::new(rid, "conflict", "a task with that keyword already exists")
            } else {
                map_db_error(rid.clone(), &e)
            }
        })?;

    tracing::info!(task_id = row.id, keyword = %row.keyword, "monitoring task created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(&req_id, TaskItem::from(row))),
    ))
}

/// GET /api/v1/tasks/{id}
pub(in crate::api) async fn get_task(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TaskItem>>, ApiError> {
    let row = load_task(&state, &req_id.0, id).await?;
    Ok(Json(ApiResponse::new(&req_id, TaskItem::from(row))))
}

/// POST /api/v1/tasks/{id}/start: marks the task active and collects it in
/// the background.
pub(in crate::api) async fn start_task(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<ApiResponse<StartedCollection>>), ApiError> {
    let rid = &req_id.0;
    let mut task = load_task(&state, rid, id).await?;

    if !task.is_active() {
        yuqing_db::set_task_status(&state.pool, id, TaskStatus::Active)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;
        TaskStatus::Active.as_str().clone_into(&mut task.status);
    }

    let platforms = task.platforms.0.clone();
    state.collector.spawn_collect(task);

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(
            &req_id,
            StartedCollection {
                task_id: id,
                status: "started",
                platforms,
            },
        )),
    ))
}

/// POST /api/v1/tasks/{id}/stop: pauses the task so the scheduler skips it.
pub(in crate::api) async fn stop_task(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TaskItem>>, ApiError> {
    let rid = &req_id.0;
    yuqing_db::set_task_status(&state.pool, id, TaskStatus::Paused)
        .await
        .map_err(|e| match e {
            yuqing_db::DbError::NotFound => {
                ApiError::new(rid, "not_found", format!("task {id} not found"))
            }
            e => map_db_error(rid.clone(), &e),
        })?;

    let row = load_task(&state, rid, id).await?;
    Ok(Json(ApiResponse::new(&req_id, TaskItem::from(row))))
}

/// GET /api/v1/tasks/{id}/items?limit=N&offset=M
pub(in crate::api) async fn list_items(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<ItemPage>>, ApiError> {
    load_task(&state, &req_id.0, id).await?;
    let limit = normalize_limit(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);

    let total = yuqing_db::count_items_by_task(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let rows = yuqing_db::list_items_by_task(&state.pool, id, limit, offset)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = rows.into_iter().map(CollectedItem::from).collect();
    Ok(Json(ApiResponse::new(&req_id, ItemPage { total, items })))
}

/// GET /api/v1/tasks/{id}/jobs
pub(in crate::api) async fn list_jobs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<JobItem>>>, ApiError> {
    load_task(&state, &req_id.0, id).await?;
    let rows = yuqing_db::list_crawl_jobs(&state.pool, id, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = rows.into_iter().map(JobItem::from).collect();
    Ok(Json(ApiResponse::new(&req_id, items)))
}

/// GET /api/v1/tasks/{id}/progress
///
/// Returns the bare progress record rather than the `data` envelope.
pub(in crate::api) async fn get_progress(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<yuqing_db::TaskProgress>, ApiError> {
    load_task(&state, &req_id.0, id).await?;
    let progress = yuqing_db::get_task_progress(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(progress))
}

/// GET /api/v1/tasks/{id}/stats?days=N or ?from=YYYY-MM-DD&to=YYYY-MM-DD
///
/// `days` returns the newest rows first; a date range returns oldest first.
pub(in crate::api) async fn list_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<ApiResponse<Vec<StatItem>>>, ApiError> {
    let range = stats_range(&req_id.0, &query)?;
    load_task(&state, &req_id.0, id).await?;

    let rows = match range {
        Some((from, to)) => yuqing_db::list_sentiment_stats_between(&state.pool, id, from, to).await,
        None => {
            let days = query.days.unwrap_or(30).clamp(1, 365);
            yuqing_db::list_sentiment_stats(&state.pool, id, days).await
        }
    }
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let items = rows.into_iter().map(StatItem::from).collect();
    Ok(Json(ApiResponse::new(&req_id, items)))
}

fn stats_range(
    request_id: &str,
    query: &StatsQuery,
) -> Result<Option<(NaiveDate, NaiveDate)>, ApiError> {
    match (query.from, query.to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) if from <= to => Ok(Some((from, to))),
        (Some(_), Some(_)) => Err(ApiError::new(
            request_id,
            "validation_error",
            "from must not be after to",
        )),
        _ => Err(ApiError::new(
            request_id,
            "validation_error",
            "from and to must be given together",
        )),
    }
}
