//! `collect`: runs the collection pipeline for one monitoring task.
//!
//! With `--dry-run` items go to an in-memory store, so the run exercises
//! adapters, deduplication and analysis without writing to the database.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use yuqing_collector::{
    collect_registered, AdapterRegistry, CollectionCoordinator, CoordinatorConfig, MemoryStore,
    DEFAULT_MOCK_SEED,
};
use yuqing_core::{AppConfig, CollectionResult, Store};
use yuqing_db::PgStore;
use yuqing_nlp::{build_analyzer, LexiconAnalyzer};

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Monitoring task id
    #[arg(long)]
    pub task: i64,
    /// Restrict to these platforms (repeatable); defaults to the task's list
    #[arg(long = "platform")]
    pub platforms: Vec<String>,
    /// Items requested per platform
    #[arg(long)]
    pub max_results: Option<usize>,
    /// Serve every platform from the mock adapter
    #[arg(long)]
    pub mock: bool,
    /// Store into memory instead of the database
    #[arg(long)]
    pub dry_run: bool,
}

impl CollectArgs {
    fn platforms_for(&self, task_platforms: &[String]) -> Vec<String> {
        if self.platforms.is_empty() {
            task_platforms.to_vec()
        } else {
            self.platforms.clone()
        }
    }
}

pub(crate) async fn run_collect(config: &AppConfig, args: CollectArgs) -> anyhow::Result<()> {
    let pool = crate::db::connect(config).await?;
    let task = yuqing_db::get_task(&pool, args.task)
        .await?
        .ok_or_else(|| anyhow::anyhow!("task {} not found", args.task))?;
    if !task.is_active() {
        tracing::warn!(task_id = task.id, status = %task.status, "collecting a task that is not active");
    }

    let task = task.to_monitoring_task();
    let platforms = args.platforms_for(&task.platforms);
    let max_results = args.max_results.unwrap_or(config.collect_max_results);

    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn Store> = if args.dry_run {
        Arc::clone(&memory) as Arc<dyn Store>
    } else {
        Arc::new(PgStore::new(pool.clone()))
    };

    let analyzer = build_analyzer(
        config.nlp_remote_url.as_deref(),
        Duration::from_secs(config.nlp_request_timeout_secs),
        Arc::new(LexiconAnalyzer::default()),
    )?;
    let coordinator = CollectionCoordinator::new(
        store,
        analyzer,
        CoordinatorConfig {
            max_concurrent_platforms: config.collect_max_concurrent_platforms,
            adapter_timeout: Duration::from_secs(config.collect_adapter_timeout_secs),
            top_k: config.nlp_top_k,
            ..CoordinatorConfig::default()
        },
    );

    let registry = if args.mock || config.collect_use_mock {
        AdapterRegistry::mock_all(DEFAULT_MOCK_SEED)
    } else {
        AdapterRegistry::new()
    };

    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received, cancelling collection");
            cancel.cancel();
        }
    });

    let results =
        collect_registered(&coordinator, &registry, &task, &platforms, max_results).await?;

    if args.dry_run {
        println!(
            "dry-run: {} item(s) and {} analysis result(s) kept in memory",
            memory.item_count(),
            memory.analysis_count()
        );
    } else {
        let days = yuqing_db::aggregate_sentiment_stats(&pool, task.id).await?;
        tracing::info!(task_id = task.id, days, "sentiment stats refreshed");
    }

    for result in &results {
        println!("{}", format_result(result));
    }

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if !results.is_empty() && failed == results.len() {
        anyhow::bail!("all {failed} platform(s) failed");
    }
    Ok(())
}

fn format_result(result: &CollectionResult) -> String {
    match result {
        CollectionResult::Collected(s) => format!(
            "{:<12} ok      collected={} stored={} duplicates={}",
            s.platform, s.collected, s.stored, s.duplicates
        ),
        CollectionResult::Failed(f) => format!("{:<12} failed  {}", f.platform, f.error),
    }
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
