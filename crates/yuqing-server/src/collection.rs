//! Runs collection for a stored monitoring task and refreshes its statistics.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::task::TaskTracker;
use yuqing_collector::{
    collect_registered, AdapterRegistry, CollectError, CollectionCoordinator, CoordinatorConfig,
    DEFAULT_MOCK_SEED,
};
use yuqing_core::{AppConfig, CollectionResult};
use yuqing_db::{PgStore, TaskRow};
use yuqing_nlp::{build_analyzer, LexiconAnalyzer};

/// Collection entry point shared by the API and the scheduler.
///
/// Background runs are spawned on a shared [`TaskTracker`] so shutdown can
/// wait for their crawl jobs to be finalized.
#[derive(Clone)]
pub struct TaskCollector {
    pool: PgPool,
    coordinator: CollectionCoordinator,
    adapters: Arc<AdapterRegistry>,
    max_results: usize,
    runs: TaskTracker,
}

impl TaskCollector {
    #[must_use]
    pub fn new(
        pool: PgPool,
        coordinator: CollectionCoordinator,
        adapters: AdapterRegistry,
        max_results: usize,
    ) -> Self {
        Self {
            pool,
            coordinator,
            adapters: Arc::new(adapters),
            max_results,
            runs: TaskTracker::new(),
        }
    }

    /// Wires a Postgres-backed coordinator from `config`.
    ///
    /// # Errors
    ///
    /// Fails if the remote analyzer is configured but cannot be built.
    pub fn from_config(
        pool: PgPool,
        config: &AppConfig,
        lexicon: Arc<LexiconAnalyzer>,
    ) -> anyhow::Result<Self> {
        let analyzer = build_analyzer(
            config.nlp_remote_url.as_deref(),
            Duration::from_secs(config.nlp_request_timeout_secs),
            lexicon,
        )?;
        let coordinator = CollectionCoordinator::new(
            Arc::new(PgStore::new(pool.clone())),
            analyzer,
            CoordinatorConfig {
                max_concurrent_platforms: config.collect_max_concurrent_platforms,
                adapter_timeout: Duration::from_secs(config.collect_adapter_timeout_secs),
                top_k: config.nlp_top_k,
                ..CoordinatorConfig::default()
            },
        );

        let adapters = if config.collect_use_mock {
            tracing::info!("mock adapters enabled for all platforms");
            AdapterRegistry::mock_all(DEFAULT_MOCK_SEED)
        } else {
            tracing::warn!(
                "no platform adapters registered; set YUQING_COLLECT_USE_MOCK=true for demo data"
            );
            AdapterRegistry::new()
        };

        Ok(Self::new(pool, coordinator, adapters, config.collect_max_results))
    }

    /// Collects every platform of `task`, then re-aggregates its daily stats.
    ///
    /// # Errors
    ///
    /// [`CollectError::InvalidInput`] if the task cannot be collected.
    pub async fn collect(&self, task: &TaskRow) -> Result<Vec<CollectionResult>, CollectError> {
        let task = task.to_monitoring_task();
        let results = collect_registered(
            &self.coordinator,
            &self.adapters,
            &task,
            &task.platforms,
            self.max_results,
        )
        .await?;

        match yuqing_db::aggregate_sentiment_stats(&self.pool, task.id).await {
            Ok(days) => tracing::debug!(task_id = task.id, days, "sentiment stats refreshed"),
            Err(e) => tracing::warn!(task_id = task.id, error = %e, "failed to refresh sentiment stats"),
        }

        Ok(results)
    }

    /// Runs [`collect`](Self::collect) in the background.
    pub fn spawn_collect(&self, task: TaskRow) {
        let collector = self.clone();
        self.spawn(async move {
            match collector.collect(&task).await {
                Ok(results) => {
                    let failed = results.iter().filter(|r| !r.is_success()).count();
                    tracing::info!(task_id = task.id, failed, "background collection finished");
                }
                Err(e) => {
                    tracing::warn!(task_id = task.id, error = %e, "background collection rejected");
                }
            }
        });
    }

    /// Spawns `work` on the tracker that [`shutdown`](Self::shutdown) drains.
    pub fn spawn<F>(&self, work: F) -> tokio::task::JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.runs.spawn(work)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.coordinator.cancellation_token().is_cancelled()
    }

    /// Fails runs still in flight without waiting for them.
    pub fn cancel(&self) {
        self.coordinator.cancellation_token().cancel();
    }

    /// Cancels in-flight runs and waits until each has finalized its crawl job.
    pub async fn shutdown(&self) {
        self.cancel();
        self.runs.close();
        self.runs.wait().await;
        tracing::info!("collection runs drained");
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use sqlx::types::Json;
    use tokio::sync::Notify;
    use yuqing_collector::MemoryStore;
    use yuqing_core::{AdapterError, JobStatus, PlatformAdapter, RawItem};

    use super::*;

    /// Signals once the search has begun, then never returns.
    struct StalledAdapter {
        entered: Arc<Notify>,
    }

    #[async_trait]
    impl PlatformAdapter for StalledAdapter {
        async fn search(&self, _keyword: &str, _max_results: usize) -> Result<Vec<RawItem>, AdapterError> {
            self.entered.notify_one();
            std::future::pending().await
        }
    }

    fn task_row() -> TaskRow {
        let now = Utc::now();
        TaskRow {
            id: 1,
            keyword: "人工智能".to_string(),
            description: None,
            platforms: Json(vec!["weibo".to_string()]),
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn shutdown_waits_for_background_runs_to_fail_their_jobs(pool: PgPool) {
        let store = Arc::new(MemoryStore::new());
        let entered = Arc::new(Notify::new());
        let mut adapters = AdapterRegistry::new();
        adapters.register(
            "weibo",
            Arc::new(StalledAdapter {
                entered: Arc::clone(&entered),
            }),
        );
        let coordinator = CollectionCoordinator::new(
            store.clone(),
            Arc::new(LexiconAnalyzer::default()),
            CoordinatorConfig::default(),
        );
        let collector = TaskCollector::new(pool, coordinator, adapters, 5);

        collector.spawn_collect(task_row());
        entered.notified().await;
        assert_eq!(store.jobs()[0].status, JobStatus::Running);

        collector.shutdown().await;

        let job = &store.jobs()[0];
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.completed_at.is_some());
        assert!(job
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("cancelled")));
    }
}
