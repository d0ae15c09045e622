//! Analysis service endpoints: `/health`, `/sentiment`, `/keywords`,
//! `/batch-analyze`.
//!
//! These keep the plain wire bodies from `yuqing_nlp::wire` and report errors
//! as `{"detail": "..."}`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use yuqing_nlp::wire::{
    BatchRequest, BatchResponse, ErrorDetail, KeywordResponse, KeywordsRequest, SentimentRequest,
    SentimentResponse, DEFAULT_KEYWORDS_TOP_K,
};
use yuqing_nlp::NlpError;

use super::AppState;

#[derive(Debug, Serialize)]
pub(in crate::api) struct ServiceHealth {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct KeywordsQuery {
    top_k: Option<usize>,
}

pub(in crate::api) struct DetailError(NlpError);

impl IntoResponse for DetailError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            NlpError::EmptyText => StatusCode::BAD_REQUEST,
            NlpError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            NlpError::Http { .. } | NlpError::InvalidResponse(_) => {
                tracing::error!(error = %self.0, "analysis failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let detail = match &self.0 {
            NlpError::EmptyText => "text must not be empty".to_string(),
            other => format!("analysis failed: {other}"),
        };
        (status, Json(ErrorDetail { detail })).into_response()
    }
}

impl From<NlpError> for DetailError {
    fn from(e: NlpError) -> Self {
        Self(e)
    }
}

/// GET /health
pub(in crate::api) async fn health() -> Json<ServiceHealth> {
    Json(ServiceHealth {
        status: "healthy",
        service: "yuqing analysis service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /sentiment
pub(in crate::api) async fn sentiment(
    State(state): State<AppState>,
    Json(body): Json<SentimentRequest>,
) -> Result<Json<SentimentResponse>, DetailError> {
    let score = state.analyzer.sentiment(&body.text, &body.language)?;
    Ok(Json(score.into()))
}

/// POST /keywords, `top_k` from the body, else the query string, else 20.
pub(in crate::api) async fn keywords(
    State(state): State<AppState>,
    Query(query): Query<KeywordsQuery>,
    Json(body): Json<KeywordsRequest>,
) -> Result<Json<Vec<KeywordResponse>>, DetailError> {
    let top_k = body
        .top_k
        .or(query.top_k)
        .unwrap_or(DEFAULT_KEYWORDS_TOP_K);
    let keywords = state.analyzer.keywords(&body.text, &body.language, top_k)?;
    Ok(Json(keywords.into_iter().map(Into::into).collect()))
}

/// POST /batch-analyze
pub(in crate::api) async fn batch_analyze(
    State(state): State<AppState>,
    Json(body): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, DetailError> {
    Ok(Json(state.analyzer.batch(&body.texts, &body.language)?))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    use super::super::{build_app, default_rate_limit_state, test_support};
    use super::*;
    use crate::middleware::AuthState;

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let app = build_app(
            test_support::state(test_support::lazy_pool()),
            AuthState::from_keys("secret", false).unwrap(),
            default_rate_limit_state(),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn sentiment_scores_text_without_auth() {
        let (status, json) = post_json(
            "/sentiment",
            serde_json::json!({"text": "great product, love it", "language": "en"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sentiment"], "positive");
        assert!(json["score"].as_f64().unwrap() > 0.6);
    }

    #[tokio::test]
    async fn blank_text_is_a_bad_request_with_detail() {
        let (status, json) = post_json("/sentiment", serde_json::json!({"text": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["detail"].as_str().unwrap().contains("empty"));
    }

    #[tokio::test]
    async fn keywords_prefers_body_top_k_over_query() {
        let (status, json) = post_json(
            "/keywords?top_k=3",
            serde_json::json!({
                "text": "rust tokio rust axum tokio rust serde",
                "language": "en",
                "top_k": 1
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let keywords = json.as_array().unwrap();
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0]["word"], "rust");
        assert_eq!(keywords[0]["frequency"], 3);
        assert!(keywords[0].get("tfidf").is_some());
    }

    #[tokio::test]
    async fn keywords_falls_back_to_query_top_k() {
        let (_, json) = post_json(
            "/keywords?top_k=2",
            serde_json::json!({"text": "rust tokio rust axum tokio rust serde", "language": "en"}),
        )
        .await;
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let (status, json) = post_json("/batch-analyze", serde_json::json!({"texts": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("detail").is_some());
    }

    #[tokio::test]
    async fn batch_returns_sentiment_per_text() {
        let (status, json) = post_json(
            "/batch-analyze",
            serde_json::json!({"texts": ["很好", "太差了"], "language": "zh"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sentiment_results"].as_array().unwrap().len(), 2);
        assert!(json["keywords"].is_array());
    }
}
