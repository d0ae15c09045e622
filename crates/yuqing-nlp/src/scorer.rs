//! Lexicon scorer: positive/negative hit counts mapped onto `[0, 1]`.

use std::collections::HashSet;

use yuqing_core::{Sentiment, SentimentScore};

use crate::lexicon::{NEGATIVE_WORDS, POSITIVE_WORDS};

/// Classifies a token sequence by counting lexicon hits.
///
/// With `p` positive hits, `n` negative hits and `len` tokens:
///
/// - `p > n`: positive, `score = 0.6 + p / (len + 1) * 0.4`
/// - `n > p`: negative, `score = 0.4 - n / (len + 1) * 0.4`
/// - otherwise neutral with `score = 0.5`
///
/// The score is clamped to `[0, 1]` and `confidence = |score - 0.5| * 2`.
/// The `len + 1` divisor is part of the formula and also covers empty input.
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    positive: HashSet<String>,
    negative: HashSet<String>,
}

impl SentimentScorer {
    pub fn with_lexicon<P, N>(positive: P, negative: N) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            positive: positive.into_iter().map(Into::into).collect(),
            negative: negative.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, tokens: &[String]) -> SentimentScore {
        let p = tokens
            .iter()
            .filter(|t| self.positive.contains(t.as_str()))
            .count();
        let n = tokens
            .iter()
            .filter(|t| self.negative.contains(t.as_str()))
            .count();
        let denominator = (tokens.len() + 1) as f64;

        let (sentiment, raw) = if p > n {
            (Sentiment::Positive, 0.6 + (p as f64 / denominator) * 0.4)
        } else if n > p {
            (Sentiment::Negative, 0.4 - (n as f64 / denominator) * 0.4)
        } else {
            return SentimentScore::neutral();
        };

        let score = raw.clamp(0.0, 1.0);
        SentimentScore {
            sentiment,
            score,
            confidence: ((score - 0.5).abs() * 2.0).clamp(0.0, 1.0),
        }
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::with_lexicon(
            POSITIVE_WORDS.iter().copied(),
            NEGATIVE_WORDS.iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_sequence_is_neutral() {
        let result = SentimentScorer::default().score(&[]);
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert!((result.score - 0.5).abs() < f64::EPSILON);
        assert!(result.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn three_positive_hits_in_ten_tokens() {
        let input = tokens(&[
            "这个", "产品", "好", "而且", "棒", "我", "很", "满意", "它", "。",
        ]);
        assert_eq!(input.len(), 10);

        let result = SentimentScorer::default().score(&input);
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_close(result.score, 0.709);
        assert_close(result.confidence, 0.418);
    }

    #[test]
    fn negative_hits_lower_score() {
        let input = tokens(&["质量", "太", "差", "了", "非常", "失望"]);
        let result = SentimentScorer::default().score(&input);
        assert_eq!(result.sentiment, Sentiment::Negative);
        // 0.4 - 2/7 * 0.4
        assert_close(result.score, 0.2857);
        assert_close(result.confidence, 0.4286);
    }

    #[test]
    fn equal_hits_are_exactly_neutral() {
        let input = tokens(&["好", "差", "一般"]);
        let result = SentimentScorer::default().score(&input);
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert!((result.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn no_hits_are_exactly_neutral() {
        let input = tokens(&["今天", "天气", "一般"]);
        let result = SentimentScorer::default().score(&input);
        assert_eq!(result, SentimentScore::neutral());
    }

    #[test]
    fn score_is_deterministic() {
        let scorer = SentimentScorer::default();
        let input = tokens(&["great", "product", "but", "slow", "and", "great"]);
        assert_eq!(scorer.score(&input), scorer.score(&input));
    }

    #[test]
    fn all_hits_stay_within_bounds() {
        let scorer = SentimentScorer::default();
        for words in [
            vec!["好"; 50],
            vec!["差"; 50],
            vec!["好"],
            vec!["差"],
        ] {
            let result = scorer.score(&tokens(&words));
            assert!((0.0..=1.0).contains(&result.score));
            assert!((0.0..=1.0).contains(&result.confidence));
        }
    }

    #[test]
    fn custom_lexicon_replaces_defaults() {
        let scorer = SentimentScorer::with_lexicon(["shiny"], ["rusty"]);
        let result = scorer.score(&tokens(&["shiny", "good"]));
        assert_eq!(result.sentiment, Sentiment::Positive);
        let result = scorer.score(&tokens(&["good"]));
        assert_eq!(result.sentiment, Sentiment::Neutral);
    }
}
