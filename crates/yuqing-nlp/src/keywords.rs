//! Frequency-ranked keyword extraction.

use std::collections::{HashMap, HashSet};

use yuqing_core::Keyword;

use crate::lexicon::STOPWORDS;

/// Selects the `k` most frequent non-stopword tokens.
///
/// Tokens shorter than `min_token_chars` characters and stopwords are
/// filtered out first. Punctuation runs such as `...` are ordinary tokens
/// here. Ties in frequency keep the order of first occurrence in the
/// filtered sequence.
///
/// `weight` is `frequency / filtered_token_count`. It is reported under the
/// `tfidf` name on the wire, but it is a plain frequency ratio.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: HashSet<String>,
    min_token_chars: usize,
}

impl KeywordExtractor {
    pub fn new<S>(stopwords: S, min_token_chars: usize) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            min_token_chars,
        }
    }

    #[must_use]
    pub fn min_token_chars(&self) -> usize {
        self.min_token_chars
    }

    fn keeps(&self, token: &str) -> bool {
        token.chars().count() >= self.min_token_chars && !self.stopwords.contains(token)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn extract_top(&self, tokens: &[String], k: usize) -> Vec<Keyword> {
        let mut ranked: Vec<(&str, u32)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut filtered_count = 0usize;

        for token in tokens.iter().map(String::as_str).filter(|t| self.keeps(t)) {
            filtered_count += 1;
            match index.get(token) {
                Some(&slot) => ranked[slot].1 += 1,
                None => {
                    index.insert(token, ranked.len());
                    ranked.push((token, 1));
                }
            }
        }

        if filtered_count == 0 {
            return Vec::new();
        }

        // Stable: equal frequencies stay in first-occurrence order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let total = filtered_count as f64;
        ranked
            .into_iter()
            .take(k)
            .map(|(word, frequency)| Keyword {
                word: word.to_string(),
                frequency,
                weight: f64::from(frequency) / total,
            })
            .collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(STOPWORDS.iter().copied(), 2)
    }
}
