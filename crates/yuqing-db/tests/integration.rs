//! Offline tests for yuqing-db pool configuration and row conversions.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use chrono::Utc;
use yuqing_core::{AppConfig, Environment, JobStatus};
use yuqing_db::{progress_percent, CrawlJobRow, DbError, PoolConfig};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        tasks_path: PathBuf::from("./config/tasks.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        collect_max_results: 50,
        collect_max_concurrent_platforms: 2,
        collect_adapter_timeout_secs: 120,
        collect_schedule: "0 */30 * * * *".to_string(),
        collect_use_mock: false,
        nlp_top_k: 10,
        nlp_remote_url: None,
        nlp_request_timeout_secs: 10,
    }
}

fn job_row(status: &str) -> CrawlJobRow {
    let now = Utc::now();
    CrawlJobRow {
        id: 3,
        task_id: 1,
        platform: "weibo".to_string(),
        status: status.to_string(),
        total_collected: 12,
        newly_stored: 9,
        duplicates: 3,
        error_message: None,
        started_at: Some(now),
        completed_at: Some(now),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout, std::time::Duration::from_secs(9));
}

#[test]
fn crawl_job_row_converts_to_domain_job() {
    let job = job_row("completed").into_crawl_job().unwrap();
    assert_eq!(job.id, 3);
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.newly_stored + job.duplicates, job.total_collected);
}

#[test]
fn crawl_job_row_with_unknown_status_is_rejected() {
    let err = job_row("paused").into_crawl_job().unwrap_err();
    assert!(matches!(err, DbError::InvalidValue(_)));
}

#[test]
fn progress_of_a_finished_job_is_complete() {
    let row = job_row("completed");
    assert_eq!(
        progress_percent(row.total_collected, row.newly_stored, row.duplicates),
        100
    );
}
