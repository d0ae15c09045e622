//! The analysis seam used by the collection pipeline and the HTTP service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use yuqing_core::{Keyword, SentimentScore};

use crate::client::RemoteAnalyzer;
use crate::error::NlpError;
use crate::keywords::KeywordExtractor;
use crate::scorer::SentimentScorer;
use crate::tokenizer::{Language, TokenPipeline};
use crate::wire::{BatchResponse, BATCH_KEYWORDS_TOP_K};

/// Sentiment and keywords for one text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnalysis {
    pub sentiment: SentimentScore,
    pub keywords: Vec<Keyword>,
}

/// Produces a [`TextAnalysis`] for a text.
///
/// Built once at startup and shared; implementations hold no mutable state.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// # Errors
    ///
    /// [`NlpError::EmptyText`] for blank input, [`NlpError::Unavailable`] when
    /// the analyzer cannot serve the request.
    async fn analyze(
        &self,
        text: &str,
        language: &str,
        top_k: usize,
    ) -> Result<TextAnalysis, NlpError>;
}

/// In-process analyzer: tokenize, score, extract.
#[derive(Clone, Default)]
pub struct LexiconAnalyzer {
    tokens: TokenPipeline,
    scorer: SentimentScorer,
    extractor: KeywordExtractor,
}

impl LexiconAnalyzer {
    #[must_use]
    pub fn new(tokens: TokenPipeline, scorer: SentimentScorer, extractor: KeywordExtractor) -> Self {
        Self {
            tokens,
            scorer,
            extractor,
        }
    }

    #[must_use]
    pub fn tokenize(&self, text: &str, language: &str) -> Vec<String> {
        self.tokens.tokenize(text, Language::from_code(language))
    }

    /// # Errors
    ///
    /// [`NlpError::EmptyText`] if `text` is blank.
    pub fn sentiment(&self, text: &str, language: &str) -> Result<SentimentScore, NlpError> {
        ensure_text(text)?;
        Ok(self.scorer.score(&self.tokenize(text, language)))
    }

    /// # Errors
    ///
    /// [`NlpError::EmptyText`] if `text` is blank.
    pub fn keywords(
        &self,
        text: &str,
        language: &str,
        top_k: usize,
    ) -> Result<Vec<Keyword>, NlpError> {
        ensure_text(text)?;
        Ok(self
            .extractor
            .extract_top(&self.tokenize(text, language), top_k))
    }

    /// Per-text sentiment for every non-blank text, plus keywords over all
    /// texts joined by a single space.
    ///
    /// # Errors
    ///
    /// [`NlpError::EmptyText`] if `texts` is empty.
    pub fn batch(&self, texts: &[String], language: &str) -> Result<BatchResponse, NlpError> {
        if texts.is_empty() {
            return Err(NlpError::EmptyText);
        }

        let sentiment_results = texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| self.scorer.score(&self.tokenize(t, language)).into())
            .collect();

        let joined = texts.join(" ");
        let keywords = self
            .extractor
            .extract_top(&self.tokenize(&joined, language), BATCH_KEYWORDS_TOP_K)
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(BatchResponse {
            sentiment_results,
            keywords,
        })
    }
}

#[async_trait]
impl TextAnalyzer for LexiconAnalyzer {
    async fn analyze(
        &self,
        text: &str,
        language: &str,
        top_k: usize,
    ) -> Result<TextAnalysis, NlpError> {
        ensure_text(text)?;
        // Tokenize once for both consumers.
        let tokens = self.tokenize(text, language);
        Ok(TextAnalysis {
            sentiment: self.scorer.score(&tokens),
            keywords: self.extractor.extract_top(&tokens, top_k),
        })
    }
}

/// The remote service at `remote_url` when one is given, `lexicon` otherwise.
///
/// # Errors
///
/// [`NlpError::Unavailable`] if the remote client cannot be built.
pub fn build_analyzer(
    remote_url: Option<&str>,
    timeout: Duration,
    lexicon: Arc<LexiconAnalyzer>,
) -> Result<Arc<dyn TextAnalyzer>, NlpError> {
    match remote_url {
        Some(url) => {
            let remote = RemoteAnalyzer::new(url, timeout)?;
            tracing::info!(url = remote.base_url(), "using remote analysis service");
            Ok(Arc::new(remote) as Arc<dyn TextAnalyzer>)
        }
        None => Ok(lexicon as Arc<dyn TextAnalyzer>),
    }
}

fn ensure_text(text: &str) -> Result<(), NlpError> {
    if text.trim().is_empty() {
        Err(NlpError::EmptyText)
    } else {
        Ok(())
    }
}
