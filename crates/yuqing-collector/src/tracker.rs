//! Lifecycle and counters of one crawl job.

use std::sync::Arc;

use chrono::Utc;
use yuqing_core::{CrawlJob, JobStatus, Store, StoreError};

/// Counters are pushed to the store after this many processed items.
pub const FLUSH_EVERY: usize = 10;

/// Owns one [`CrawlJob`] from creation to its single finalization.
///
/// `complete` and `fail` consume the tracker, so a job cannot be finalized
/// twice. Persistence after creation is best effort: a failed write is
/// logged and the in-memory job stays authoritative for the caller.
pub struct JobStatusTracker {
    store: Arc<dyn Store>,
    job: CrawlJob,
    unflushed: usize,
}

impl JobStatusTracker {
    /// Creates the job (`pending`) and moves it to `running`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the job record cannot be created.
    pub async fn start(
        store: Arc<dyn Store>,
        task_id: i64,
        platform: &str,
    ) -> Result<Self, StoreError> {
        let job = store.create_job(task_id, platform).await?;
        let mut tracker = Self {
            store,
            job,
            unflushed: 0,
        };
        tracker.job.started_at = Some(Utc::now());
        tracker.transition(JobStatus::Running);
        tracker.persist().await;
        Ok(tracker)
    }

    #[must_use]
    pub fn job(&self) -> &CrawlJob {
        &self.job
    }

    pub fn record_collected(&mut self, count: usize) {
        self.job.total_collected = saturating_i32(count);
    }

    pub async fn record_stored(&mut self) {
        self.job.newly_stored = self.job.newly_stored.saturating_add(1);
        self.item_processed().await;
    }

    pub async fn record_duplicate(&mut self) {
        self.job.duplicates = self.job.duplicates.saturating_add(1);
        self.item_processed().await;
    }

    /// An item that was neither stored nor a duplicate.
    pub async fn record_skipped(&mut self) {
        self.item_processed().await;
    }

    pub async fn complete(mut self) -> CrawlJob {
        self.finalize(JobStatus::Completed, None).await;
        self.job
    }

    pub async fn fail(mut self, message: impl Into<String>) -> CrawlJob {
        self.finalize(JobStatus::Failed, Some(message.into())).await;
        self.job
    }

    async fn finalize(&mut self, status: JobStatus, error_message: Option<String>) {
        self.transition(status);
        self.job.error_message = error_message;
        self.job.completed_at = Some(Utc::now());
        self.persist().await;
        tracing::info!(
            job_id = self.job.id,
            task_id = self.job.task_id,
            platform = %self.job.platform,
            status = %self.job.status,
            collected = self.job.total_collected,
            stored = self.job.newly_stored,
            duplicates = self.job.duplicates,
            "crawl job finalized"
        );
    }

    async fn item_processed(&mut self) {
        self.unflushed += 1;
        if self.unflushed >= FLUSH_EVERY {
            self.persist().await;
        }
    }

    fn transition(&mut self, next: JobStatus) {
        debug_assert!(
            self.job.status.can_transition_to(next),
            "illegal crawl job transition {} -> {next}",
            self.job.status
        );
        self.job.status = next;
    }

    async fn persist(&mut self) {
        self.unflushed = 0;
        if let Err(e) = self.store.update_job(&self.job).await {
            if self.job.status.is_terminal() {
                tracing::error!(
                    job_id = self.job.id,
                    platform = %self.job.platform,
                    status = %self.job.status,
                    error = %e,
                    "failed to persist final crawl job state"
                );
            } else {
                tracing::warn!(
                    job_id = self.job.id,
                    platform = %self.job.platform,
                    error = %e,
                    "failed to persist crawl job progress"
                );
            }
        }
    }
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
