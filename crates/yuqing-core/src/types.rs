//! Domain records shared by the collector, the analyzers, and the store.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// A keyword-monitoring task. Immutable for the duration of a collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringTask {
    pub id: i64,
    pub keyword: String,
    pub platforms: Vec<String>,
}

/// One platform's unit of content, exactly as the adapter produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub platform: String,
    /// Unique within `platform`.
    pub platform_id: String,
    pub author: Option<String>,
    pub author_id: Option<String>,
    pub content: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes: i32,
    #[serde(default)]
    pub replies: i32,
    #[serde(default)]
    pub shares: i32,
}

/// A [`RawItem`] after persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredItem {
    pub id: i64,
    pub task_id: i64,
    #[serde(flatten)]
    pub item: RawItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            other => Err(format!("unknown sentiment '{other}'")),
        }
    }
}

/// Output of the lexicon scorer. `score` and `confidence` are in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
}

impl SentimentScore {
    /// The score assigned when positive and negative hits tie.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 0.5,
            confidence: 0.0,
        }
    }
}

/// One extracted keyword. `weight` is `frequency / filtered_token_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub frequency: u32,
    pub weight: f64,
}

/// Sentiment and keywords for one stored item. Re-analysis replaces it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub item_id: i64,
    pub sentiment: Sentiment,
    pub score: f64,
    pub confidence: f64,
    pub keywords: Vec<Keyword>,
}

impl AnalysisResult {
    #[must_use]
    pub fn new(item_id: i64, score: SentimentScore, keywords: Vec<Keyword>) -> Self {
        Self {
            item_id,
            sentiment: score.sentiment,
            score: score.score,
            confidence: score.confidence,
            keywords,
        }
    }
}

/// Counters reported for a platform run that reached the adapter successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub platform: String,
    pub keyword: String,
    pub collected: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFailure {
    pub platform: String,
    pub error: String,
}

/// Outcome of one platform run, serialized as the flat record callers expect:
/// `{success: true, platform, keyword, collected, stored, duplicates, timestamp}`
/// or `{success: false, platform, error}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionResult {
    Collected(CollectionSummary),
    Failed(CollectionFailure),
}

impl CollectionResult {
    pub fn failed(platform: impl Into<String>, error: impl Into<String>) -> Self {
        CollectionResult::Failed(CollectionFailure {
            platform: platform.into(),
            error: error.into(),
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, CollectionResult::Collected(_))
    }

    #[must_use]
    pub fn platform(&self) -> &str {
        match self {
            CollectionResult::Collected(s) => &s.platform,
            CollectionResult::Failed(f) => &f.platform,
        }
    }
}

impl Serialize for CollectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CollectionResult::Collected(s) => {
                let mut st = serializer.serialize_struct("CollectionResult", 7)?;
                st.serialize_field("success", &true)?;
                st.serialize_field("platform", &s.platform)?;
                st.serialize_field("keyword", &s.keyword)?;
                st.serialize_field("collected", &s.collected)?;
                st.serialize_field("stored", &s.stored)?;
                st.serialize_field("duplicates", &s.duplicates)?;
                st.serialize_field("timestamp", &s.timestamp.to_rfc3339())?;
                st.end()
            }
            CollectionResult::Failed(f) => {
                let mut st = serializer.serialize_struct("CollectionResult", 3)?;
                st.serialize_field("success", &false)?;
                st.serialize_field("platform", &f.platform)?;
                st.serialize_field("error", &f.error)?;
                st.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_round_trips_through_str() {
        for s in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
            assert_eq!(s.as_str().parse::<Sentiment>().unwrap(), s);
        }
        assert!("mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn successful_result_serializes_flat_record() {
        let ts = DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let result = CollectionResult::Collected(CollectionSummary {
            platform: "weibo".to_string(),
            keyword: "人工智能".to_string(),
            collected: 12,
            stored: 9,
            duplicates: 3,
            timestamp: ts,
        });

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["platform"], "weibo");
        assert_eq!(json["keyword"], "人工智能");
        assert_eq!(json["collected"], 12);
        assert_eq!(json["stored"], 9);
        assert_eq!(json["duplicates"], 3);
        assert_eq!(json["timestamp"], "2026-03-01T08:00:00+00:00");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failed_result_serializes_error_only() {
        let result = CollectionResult::failed("zhihu", "zhihu: rate limited");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["platform"], "zhihu");
        assert_eq!(json["error"], "zhihu: rate limited");
        assert!(json.get("collected").is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn stored_item_flattens_raw_fields() {
        let item = StoredItem {
            id: 7,
            task_id: 3,
            item: RawItem {
                platform: "reddit".to_string(),
                platform_id: "t3_abc".to_string(),
                author: None,
                author_id: None,
                content: "hello".to_string(),
                url: None,
                published_at: None,
                likes: 1,
                replies: 0,
                shares: 0,
            },
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["platform_id"], "t3_abc");
    }
}
