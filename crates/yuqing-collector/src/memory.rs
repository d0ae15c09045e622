//! In-process [`Store`] for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use yuqing_core::{
    AnalysisResult, CrawlJob, JobStatus, RawItem, SaveOutcome, Store, StoreError, StoredItem,
};

#[derive(Default)]
struct Inner {
    items: Vec<StoredItem>,
    by_key: HashMap<(String, String), i64>,
    analyses: HashMap<i64, AnalysisResult>,
    jobs: Vec<CrawlJob>,
}

/// Everything lives behind one lock, so insert-or-fetch is atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn items(&self) -> Vec<StoredItem> {
        self.lock().items.clone()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lock().items.len()
    }

    #[must_use]
    pub fn analysis(&self, item_id: i64) -> Option<AnalysisResult> {
        self.lock().analyses.get(&item_id).cloned()
    }

    #[must_use]
    pub fn analysis_count(&self) -> usize {
        self.lock().analyses.len()
    }

    #[must_use]
    pub fn jobs(&self) -> Vec<CrawlJob> {
        self.lock().jobs.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn is_known(&self, platform: &str, platform_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .lock()
            .by_key
            .contains_key(&(platform.to_string(), platform_id.to_string())))
    }

    async fn save_item(&self, task_id: i64, item: &RawItem) -> Result<SaveOutcome, StoreError> {
        let mut inner = self.lock();
        let key = (item.platform.clone(), item.platform_id.clone());
        if let Some(&id) = inner.by_key.get(&key) {
            return Ok(SaveOutcome { id, is_new: false });
        }

        let id = i64::try_from(inner.items.len())
            .map_err(|e| StoreError::Backend(e.to_string()))?
            + 1;
        inner.items.push(StoredItem {
            id,
            task_id,
            item: item.clone(),
        });
        inner.by_key.insert(key, id);
        Ok(SaveOutcome { id, is_new: true })
    }

    async fn save_analysis(&self, analysis: &AnalysisResult) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if !inner.items.iter().any(|i| i.id == analysis.item_id) {
            return Err(StoreError::NotFound);
        }
        inner.analyses.insert(analysis.item_id, analysis.clone());
        Ok(())
    }

    async fn create_job(&self, task_id: i64, platform: &str) -> Result<CrawlJob, StoreError> {
        let mut inner = self.lock();
        let id = i64::try_from(inner.jobs.len())
            .map_err(|e| StoreError::Backend(e.to_string()))?
            + 1;
        let job = CrawlJob::pending(id, task_id, platform);
        inner.jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, job: &CrawlJob) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let current = inner
            .jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or(StoreError::NotFound)?;

        let allowed = if current.status == job.status {
            !job.status.is_terminal()
        } else {
            current.status.can_transition_to(job.status)
        };
        if !allowed {
            let expected = match job.status {
                JobStatus::Pending => "none",
                JobStatus::Running => "pending",
                JobStatus::Completed | JobStatus::Failed => "running",
            };
            return Err(StoreError::InvalidTransition {
                id: job.id,
                expected,
            });
        }

        *current = job.clone();
        if current.status == JobStatus::Running && current.started_at.is_none() {
            current.started_at = Some(Utc::now());
        }
        Ok(())
    }
}
