//! Background job scheduler.
//!
//! Runs collection for every active monitoring task on the configured cron
//! schedule.

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::collection::TaskCollector;

/// Builds and starts the scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if `schedule` is not a valid cron
/// expression or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    collector: TaskCollector,
    schedule: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let pool = pool.clone();
        let collector = collector.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting collection run");
            let run = collector.clone();
            // Tracked so shutdown waits for this run's crawl jobs.
            let handle = collector.spawn(async move { run_active_tasks(&pool, &run).await });
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "scheduler: collection run aborted");
            }
            tracing::info!("scheduler: collection run complete");
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    tracing::info!(schedule, "scheduler: collection job registered");
    Ok(scheduler)
}

async fn run_active_tasks(pool: &PgPool, collector: &TaskCollector) {
    let tasks = match yuqing_db::list_active_tasks(pool).await {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load active tasks");
            return;
        }
    };

    if tasks.is_empty() {
        tracing::info!("scheduler: no active tasks; skipping");
        return;
    }

    for task in &tasks {
        if collector.is_cancelled() {
            tracing::info!("scheduler: shutting down; remaining tasks skipped");
            return;
        }
        match collector.collect(task).await {
            Ok(results) => {
                let failed = results.iter().filter(|r| !r.is_success()).count();
                tracing::info!(
                    task_id = task.id,
                    keyword = %task.keyword,
                    platforms = results.len(),
                    failed,
                    "scheduler: task collected"
                );
            }
            Err(e) => {
                tracing::warn!(task_id = task.id, error = %e, "scheduler: task skipped");
            }
        }
    }
}
