//! Persistence contract consumed by the collection pipeline.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::job::CrawlJob;
use crate::types::{AnalysisResult, RawItem};

/// Result of an insert-or-fetch on `(platform, platform_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: i64,
    /// `false` when an item with the same `(platform, platform_id)` already existed.
    pub is_new: bool,
}

/// Storage backend for items, analyses, and crawl jobs.
///
/// Must be safe for concurrent callers. `save_item` is the final arbiter of
/// uniqueness: for any `(platform, platform_id)` at most one item exists, and
/// a losing writer gets either `is_new = false` or [`StoreError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Advisory existence check used by the deduplication gate.
    async fn is_known(&self, platform: &str, platform_id: &str) -> Result<bool, StoreError>;

    /// Atomically insert the item or resolve to the existing row.
    async fn save_item(&self, task_id: i64, item: &RawItem) -> Result<SaveOutcome, StoreError>;

    /// Insert or replace the analysis for `analysis.item_id`.
    async fn save_analysis(&self, analysis: &AnalysisResult) -> Result<(), StoreError>;

    /// Create a `pending` job for one `(task_id, platform)` run.
    async fn create_job(&self, task_id: i64, platform: &str) -> Result<CrawlJob, StoreError>;

    /// Persist the job's current status and counters.
    async fn update_job(&self, job: &CrawlJob) -> Result<(), StoreError>;
}
