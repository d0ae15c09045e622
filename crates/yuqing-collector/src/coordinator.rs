//! Runs platform adapters for a task and turns their output into stored,
//! analyzed items.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use yuqing_core::{
    AdapterCause, AdapterError, AnalysisResult, CollectionResult, CollectionSummary,
    MonitoringTask, PlatformAdapter, RawItem, SaveOutcome, Store, StoreError,
};
use yuqing_nlp::{NlpError, TextAnalyzer};

use crate::error::CollectError;
use crate::gate::DeduplicationGate;
use crate::tracker::JobStatusTracker;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Upper bound on platform runs in flight for one `coordinate` call.
    pub max_concurrent_platforms: usize,
    /// Time box for a single `search` call.
    pub adapter_timeout: Duration,
    /// Language code handed to the analyzer.
    pub language: String,
    /// Keywords kept per analyzed item.
    pub top_k: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_platforms: 2,
            adapter_timeout: Duration::from_secs(120),
            language: "zh".to_string(),
            top_k: 10,
        }
    }
}

/// One platform to collect from.
#[derive(Clone)]
pub struct PlatformRun {
    pub name: String,
    pub adapter: Arc<dyn PlatformAdapter>,
    pub max_results: usize,
}

impl PlatformRun {
    pub fn new(
        name: impl Into<String>,
        adapter: Arc<dyn PlatformAdapter>,
        max_results: usize,
    ) -> Self {
        Self {
            name: name.into(),
            adapter,
            max_results,
        }
    }
}

enum ItemOutcome {
    Stored,
    Duplicate,
    Skipped,
}

/// Drives collection for monitoring tasks.
///
/// Cheap to clone; clones share the store, the dedup gate, the analyzer and
/// the cancellation token.
#[derive(Clone)]
pub struct CollectionCoordinator {
    store: Arc<dyn Store>,
    gate: Arc<DeduplicationGate>,
    analyzer: Arc<dyn TextAnalyzer>,
    config: CoordinatorConfig,
    cancel: CancellationToken,
}

impl CollectionCoordinator {
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        analyzer: Arc<dyn TextAnalyzer>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            gate: Arc::new(DeduplicationGate::new(Arc::clone(&store))),
            store,
            analyzer,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Ties every run to `token`. Cancelling it fails runs still in flight.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Collects from one platform and returns its result.
    ///
    /// Adapter failures, timeouts and cancellation come back as a failed
    /// [`CollectionResult`]; the crawl job is finalized exactly once before
    /// this returns.
    ///
    /// # Errors
    ///
    /// [`CollectError::InvalidInput`] for a blank keyword or platform name or a
    /// zero `max_results`. Nothing is called in that case.
    pub async fn run_collection(
        &self,
        task: &MonitoringTask,
        platform: &str,
        adapter: &dyn PlatformAdapter,
        max_results: usize,
    ) -> Result<CollectionResult, CollectError> {
        validate_task(task)?;
        validate_run(platform, max_results)?;
        Ok(self.collect(task, platform, adapter, max_results).await)
    }

    /// Collects from every platform in `runs`, at most
    /// `max_concurrent_platforms` at a time. Returns one result per run, in
    /// request order.
    ///
    /// # Errors
    ///
    /// [`CollectError::InvalidInput`] if the task or any run is invalid. All
    /// runs are validated before any adapter is called.
    pub async fn coordinate(
        &self,
        task: &MonitoringTask,
        runs: Vec<PlatformRun>,
    ) -> Result<Vec<CollectionResult>, CollectError> {
        validate_task(task)?;
        for run in &runs {
            validate_run(&run.name, run.max_results)?;
        }

        tracing::info!(
            task_id = task.id,
            keyword = %task.keyword,
            platforms = runs.len(),
            "starting collection"
        );

        let limit = self.config.max_concurrent_platforms.max(1);
        let results: Vec<CollectionResult> = stream::iter(runs)
            .map(|run| {
                let this = self.clone();
                let task = task.clone();
                async move {
                    let name = run.name.clone();
                    // Own task per platform: a panicking adapter only loses its own result.
                    let handle = tokio::spawn(async move {
                        this.collect(&task, &run.name, run.adapter.as_ref(), run.max_results)
                            .await
                    });
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => {
                            tracing::error!(platform = %name, error = %e, "platform run aborted");
                            CollectionResult::failed(name, format!("platform run aborted: {e}"))
                        }
                    }
                }
            })
            .buffered(limit)
            .collect()
            .await;

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            task_id = task.id,
            succeeded,
            failed = results.len() - succeeded,
            "collection finished"
        );

        Ok(results)
    }

    async fn collect(
        &self,
        task: &MonitoringTask,
        platform: &str,
        adapter: &dyn PlatformAdapter,
        max_results: usize,
    ) -> CollectionResult {
        let mut tracker =
            match JobStatusTracker::start(Arc::clone(&self.store), task.id, platform).await {
                Ok(tracker) => tracker,
                Err(e) => {
                    tracing::error!(
                        task_id = task.id,
                        platform,
                        error = %e,
                        "could not create crawl job"
                    );
                    return CollectionResult::failed(
                        platform,
                        format!("could not create crawl job: {e}"),
                    );
                }
            };

        tracing::info!(
            task_id = task.id,
            platform,
            job_id = tracker.job().id,
            max_results,
            "platform run started"
        );

        let items = match self.search(platform, adapter, &task.keyword, max_results).await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(task_id = task.id, platform, error = %e, "adapter failed");
                let message = e.to_string();
                tracker.fail(message.clone()).await;
                return CollectionResult::failed(platform, message);
            }
        };

        tracker.record_collected(items.len());

        for item in &items {
            if self.cancel.is_cancelled() {
                let err = AdapterError::new(platform, AdapterCause::Cancelled);
                tracing::warn!(
                    task_id = task.id,
                    platform,
                    stored = tracker.job().newly_stored,
                    "run cancelled mid-batch"
                );
                let message = err.to_string();
                tracker.fail(message.clone()).await;
                return CollectionResult::failed(platform, message);
            }

            match self.process_item(task.id, item).await {
                ItemOutcome::Stored => tracker.record_stored().await,
                ItemOutcome::Duplicate => tracker.record_duplicate().await,
                ItemOutcome::Skipped => tracker.record_skipped().await,
            }
        }

        let job = tracker.complete().await;
        CollectionResult::Collected(CollectionSummary {
            platform: platform.to_string(),
            keyword: task.keyword.clone(),
            collected: items.len(),
            stored: usize::try_from(job.newly_stored).unwrap_or_default(),
            duplicates: usize::try_from(job.duplicates).unwrap_or_default(),
            timestamp: Utc::now(),
        })
    }

    async fn search(
        &self,
        platform: &str,
        adapter: &dyn PlatformAdapter,
        keyword: &str,
        max_results: usize,
    ) -> Result<Vec<RawItem>, AdapterError> {
        let timeout = self.config.adapter_timeout;
        // A panicking adapter fails its own job instead of unwinding past the tracker.
        let call = AssertUnwindSafe(adapter.search(keyword, max_results)).catch_unwind();
        tokio::select! {
            () = self.cancel.cancelled() => {
                Err(AdapterError::new(platform, AdapterCause::Cancelled))
            }
            outcome = tokio::time::timeout(timeout, call) => match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(payload)) => Err(AdapterError::new(
                    platform,
                    AdapterCause::Other(format!("adapter panicked: {}", panic_message(&*payload))),
                )),
                Err(_) => Err(AdapterError::new(platform, AdapterCause::Timeout(timeout.as_secs()))),
            },
        }
    }

    async fn process_item(&self, task_id: i64, item: &RawItem) -> ItemOutcome {
        if self.gate.is_known(&item.platform, &item.platform_id).await {
            tracing::debug!(
                platform = %item.platform,
                platform_id = %item.platform_id,
                "duplicate item skipped"
            );
            return ItemOutcome::Duplicate;
        }

        match self.store.save_item(task_id, item).await {
            Ok(SaveOutcome { id, is_new: true }) => {
                self.gate.remember(&item.platform, &item.platform_id);
                self.analyze(id, item).await;
                ItemOutcome::Stored
            }
            Ok(SaveOutcome { is_new: false, .. }) | Err(StoreError::Conflict(_)) => {
                // Another writer won the race for this pair.
                self.gate.remember(&item.platform, &item.platform_id);
                ItemOutcome::Duplicate
            }
            Err(e) => {
                tracing::warn!(
                    platform = %item.platform,
                    platform_id = %item.platform_id,
                    error = %e,
                    "failed to store item"
                );
                ItemOutcome::Skipped
            }
        }
    }

    async fn analyze(&self, item_id: i64, item: &RawItem) {
        let analysis = match self
            .analyzer
            .analyze(&item.content, &self.config.language, self.config.top_k)
            .await
        {
            Ok(analysis) => analysis,
            Err(NlpError::EmptyText) => {
                tracing::debug!(item_id, "item has no text, skipping analysis");
                return;
            }
            Err(e) => {
                tracing::warn!(item_id, error = %e, "analysis unavailable, item kept without analysis");
                return;
            }
        };

        let result = AnalysisResult::new(item_id, analysis.sentiment, analysis.keywords);
        if let Err(e) = self.store.save_analysis(&result).await {
            tracing::warn!(item_id, error = %e, "failed to store analysis");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn validate_task(task: &MonitoringTask) -> Result<(), CollectError> {
    if task.keyword.trim().is_empty() {
        return Err(CollectError::InvalidInput(format!(
            "task {} has an empty keyword",
            task.id
        )));
    }
    Ok(())
}

fn validate_run(platform: &str, max_results: usize) -> Result<(), CollectError> {
    if platform.trim().is_empty() {
        return Err(CollectError::InvalidInput(
            "platform name must be non-empty".to_string(),
        ));
    }
    if max_results == 0 {
        return Err(CollectError::InvalidInput(format!(
            "max_results for {platform} must be greater than zero"
        )));
    }
    Ok(())
}
