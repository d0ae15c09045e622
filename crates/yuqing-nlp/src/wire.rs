//! Request and response bodies of the analysis service.
//!
//! Shared by the HTTP handlers that serve the contract and by
//! [`RemoteAnalyzer`](crate::RemoteAnalyzer), which consumes it.

use serde::{Deserialize, Serialize};
use yuqing_core::{Keyword, Sentiment, SentimentScore};

pub const DEFAULT_LANGUAGE: &str = "zh";
pub const DEFAULT_KEYWORDS_TOP_K: usize = 20;
pub const BATCH_KEYWORDS_TOP_K: usize = 30;

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
}

impl From<SentimentScore> for SentimentResponse {
    fn from(s: SentimentScore) -> Self {
        Self {
            sentiment: s.sentiment,
            score: s.score,
            confidence: s.confidence,
        }
    }
}

impl From<SentimentResponse> for SentimentScore {
    fn from(r: SentimentResponse) -> Self {
        Self {
            sentiment: r.sentiment,
            score: r.score,
            confidence: r.confidence,
        }
    }
}

/// `top_k` may also arrive as a query parameter; the body value wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordsRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResponse {
    pub word: String,
    pub frequency: u32,
    pub tfidf: f64,
}

impl From<Keyword> for KeywordResponse {
    fn from(k: Keyword) -> Self {
        Self {
            word: k.word,
            frequency: k.frequency,
            tfidf: k.weight,
        }
    }
}

impl From<KeywordResponse> for Keyword {
    fn from(k: KeywordResponse) -> Self {
        Self {
            word: k.word,
            frequency: k.frequency,
            weight: k.tfidf,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub sentiment_results: Vec<SentimentResponse>,
    pub keywords: Vec<KeywordResponse>,
}

/// Error body returned by the analysis endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_request_defaults_language() {
        let req: SentimentRequest = serde_json::from_str(r#"{"text":"很好"}"#).unwrap();
        assert_eq!(req.language, "zh");
    }

    #[test]
    fn keyword_weight_is_serialized_as_tfidf() {
        let body = serde_json::to_value(KeywordResponse::from(Keyword {
            word: "续航".to_string(),
            frequency: 3,
            weight: 0.25,
        }))
        .unwrap();
        assert_eq!(body["word"], "续航");
        assert_eq!(body["frequency"], 3);
        assert_eq!(body["tfidf"], 0.25);
        assert!(body.get("weight").is_none());
    }

    #[test]
    fn keywords_request_omits_absent_top_k() {
        let req = KeywordsRequest {
            text: "x".to_string(),
            language: "en".to_string(),
            top_k: None,
        };
        let body = serde_json::to_value(req).unwrap();
        assert!(body.get("top_k").is_none());
    }

    #[test]
    fn sentiment_response_uses_lowercase_labels() {
        let body = serde_json::to_value(SentimentResponse::from(SentimentScore::neutral())).unwrap();
        assert_eq!(body["sentiment"], "neutral");
        assert_eq!(body["score"], 0.5);
    }
}
