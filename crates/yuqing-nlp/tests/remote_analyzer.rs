//! Integration tests for `RemoteAnalyzer` against a local `wiremock` server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yuqing_core::Sentiment;
use yuqing_nlp::{NlpError, RemoteAnalyzer, TextAnalyzer};

fn analyzer_for(server: &MockServer) -> RemoteAnalyzer {
    RemoteAnalyzer::new(&server.uri(), Duration::from_secs(5)).expect("failed to build analyzer")
}

async fn mount_keywords(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/keywords"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn analyze_combines_sentiment_and_keywords() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sentiment"))
        .and(body_partial_json(json!({"text": "续航很好", "language": "zh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sentiment": "positive",
            "score": 0.733,
            "confidence": 0.466
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/keywords"))
        .and(query_param("top_k", "5"))
        .and(body_partial_json(json!({"top_k": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"word": "续航", "frequency": 1, "tfidf": 1.0}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let result = analyzer_for(&server)
        .analyze("续航很好", "zh", 5)
        .await
        .expect("analysis should succeed");

    assert_eq!(result.sentiment.sentiment, Sentiment::Positive);
    assert!((result.sentiment.score - 0.733).abs() < 1e-9);
    assert_eq!(result.keywords.len(), 1);
    assert_eq!(result.keywords[0].word, "续航");
    assert!((result.keywords[0].weight - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn service_unavailable_maps_to_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sentiment"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"detail": "NLP service not initialized"})),
        )
        .mount(&server)
        .await;
    mount_keywords(&server, json!([])).await;

    let err = analyzer_for(&server)
        .analyze("text", "zh", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, NlpError::Unavailable(_)), "got: {err:?}");
}

#[tokio::test]
async fn client_error_keeps_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sentiment"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Text cannot be empty"})),
        )
        .mount(&server)
        .await;

    let err = analyzer_for(&server)
        .analyze("text", "zh", 5)
        .await
        .unwrap_err();
    match err {
        NlpError::Http { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Text cannot be empty"));
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sentiment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sentiment": "ecstatic",
            "score": 1.0,
            "confidence": 1.0
        })))
        .mount(&server)
        .await;

    let err = analyzer_for(&server)
        .analyze("text", "zh", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, NlpError::InvalidResponse(_)), "got: {err:?}");
}

#[tokio::test]
async fn blank_text_never_reaches_the_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = analyzer_for(&server).analyze("  ", "zh", 5).await.unwrap_err();
    assert!(matches!(err, NlpError::EmptyText));
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let analyzer = RemoteAnalyzer::new(&uri, Duration::from_secs(2)).unwrap();
    let err = analyzer.analyze("text", "zh", 5).await.unwrap_err();
    assert!(matches!(err, NlpError::Unavailable(_)), "got: {err:?}");
}

#[test]
fn trailing_slash_is_trimmed_from_base_url() {
    let analyzer = RemoteAnalyzer::new("http://nlp:8000/", Duration::from_secs(1)).unwrap();
    assert_eq!(analyzer.base_url(), "http://nlp:8000");
}
