//! HTTP client for a remote analysis service.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::analyzer::{TextAnalysis, TextAnalyzer};
use crate::error::NlpError;
use crate::wire::{KeywordResponse, KeywordsRequest, SentimentRequest, SentimentResponse};

/// Delegates analysis to a service exposing `POST /sentiment` and
/// `POST /keywords`.
#[derive(Debug, Clone)]
pub struct RemoteAnalyzer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteAnalyzer {
    /// # Errors
    ///
    /// Returns [`NlpError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NlpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NlpError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, NlpError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| NlpError::Unavailable(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(NlpError::Unavailable(format!(
                "{url} returned status {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NlpError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| NlpError::InvalidResponse(format!("{url}: {e}")))
    }
}

#[async_trait]
impl TextAnalyzer for RemoteAnalyzer {
    async fn analyze(
        &self,
        text: &str,
        language: &str,
        top_k: usize,
    ) -> Result<TextAnalysis, NlpError> {
        if text.trim().is_empty() {
            return Err(NlpError::EmptyText);
        }

        let sentiment: SentimentResponse = self
            .post(
                "/sentiment",
                &SentimentRequest {
                    text: text.to_string(),
                    language: language.to_string(),
                },
            )
            .await?;

        // Older deployments read top_k from the query string only.
        let keywords: Vec<KeywordResponse> = self
            .post(
                &format!("/keywords?top_k={top_k}"),
                &KeywordsRequest {
                    text: text.to_string(),
                    language: language.to_string(),
                    top_k: Some(top_k),
                },
            )
            .await?;

        Ok(TextAnalysis {
            sentiment: sentiment.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        })
    }
}
