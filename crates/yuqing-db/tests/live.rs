//! Live tests for yuqing-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database. The
//! `migrations` path is relative to `crates/yuqing-db/`.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use yuqing_core::{
    AnalysisResult, Keyword, RawItem, Sentiment, SentimentScore, Store, StoreError, TaskConfig,
    TaskStatus, JobStatus,
};
use yuqing_db::{
    aggregate_sentiment_stats, count_items_by_task, create_crawl_job, create_task,
    get_analysis, get_crawl_job, get_task, get_task_progress, insert_item, item_exists,
    list_active_tasks, list_crawl_jobs, list_items_by_task, list_sentiment_stats,
    list_sentiment_stats_between, list_tasks, seed_tasks,
    set_task_status, update_crawl_job, upsert_analysis, DbError, PgStore,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_test_task(pool: &sqlx::PgPool, keyword: &str) -> i64 {
    create_task(pool, keyword, None, &["weibo".to_string(), "zhihu".to_string()])
        .await
        .unwrap_or_else(|e| panic!("create_task failed for '{keyword}': {e}"))
        .id
}

fn raw_item(platform: &str, platform_id: &str, content: &str) -> RawItem {
    RawItem {
        platform: platform.to_string(),
        platform_id: platform_id.to_string(),
        author: Some("科技观察者".to_string()),
        author_id: None,
        content: content.to_string(),
        url: None,
        published_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()),
        likes: 10,
        replies: 2,
        shares: 1,
    }
}

fn analysis(item_id: i64, sentiment: Sentiment, score: f64) -> AnalysisResult {
    AnalysisResult::new(
        item_id,
        SentimentScore {
            sentiment,
            score,
            confidence: (score - 0.5).abs() * 2.0,
        },
        vec![Keyword {
            word: "人工智能".to_string(),
            frequency: 2,
            weight: 0.5,
        }],
    )
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_task_rejects_case_insensitive_duplicates(pool: sqlx::PgPool) {
    insert_test_task(&pool, "Rust Language").await;
    let err = create_task(&pool, "rust language", None, &["twitter".to_string()])
        .await
        .unwrap_err();
    assert!(err.is_unique_violation(), "unexpected error: {err}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn paused_tasks_are_not_active(pool: sqlx::PgPool) {
    let a = insert_test_task(&pool, "人工智能").await;
    let b = insert_test_task(&pool, "新能源汽车").await;
    set_task_status(&pool, b, TaskStatus::Paused).await.unwrap();

    let active = list_active_tasks(&pool).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, a);

    let paused = list_tasks(&pool, Some(TaskStatus::Paused), 10).await.unwrap();
    assert_eq!(paused.len(), 1);
    assert!(!paused[0].is_active());

    let task = get_task(&pool, a).await.unwrap().unwrap().to_monitoring_task();
    assert_eq!(task.platforms, vec!["weibo", "zhihu"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn set_task_status_on_missing_task_is_not_found(pool: sqlx::PgPool) {
    let err = set_task_status(&pool, 999, TaskStatus::Paused).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn seed_tasks_is_idempotent(pool: sqlx::PgPool) {
    let tasks = vec![
        TaskConfig {
            keyword: "人工智能".to_string(),
            description: Some("AI".to_string()),
            platforms: vec!["weibo".to_string()],
            status: TaskStatus::Active,
        },
        TaskConfig {
            keyword: "rust language".to_string(),
            description: None,
            platforms: vec!["twitter".to_string()],
            status: TaskStatus::Paused,
        },
    ];

    assert_eq!(seed_tasks(&pool, &tasks).await.unwrap(), 2);
    assert_eq!(seed_tasks(&pool, &tasks).await.unwrap(), 2);

    let all = list_tasks(&pool, None, 10).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(list_active_tasks(&pool).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn insert_item_resolves_repeat_to_existing_row(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let item = raw_item("weibo", "w-1", "人工智能很好");

    let first = insert_item(&pool, task_id, &item).await.unwrap();
    let second = insert_item(&pool, task_id, &item).await.unwrap();

    assert!(first.is_new);
    assert!(!second.is_new);
    assert_eq!(first.id, second.id);
    assert_eq!(count_items_by_task(&pool, task_id).await.unwrap(), 1);
    assert!(item_exists(&pool, "weibo", "w-1").await.unwrap());
    assert!(!item_exists(&pool, "zhihu", "w-1").await.unwrap());
}

#[sqlx::test(migrations = "../../migrations")]
async fn concurrent_inserts_store_one_row(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let item = raw_item("weibo", "race", "同一条内容");

    let (a, b) = tokio::join!(
        insert_item(&pool, task_id, &item),
        insert_item(&pool, task_id, &item)
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.id, b.id);
    assert!(a.is_new ^ b.is_new);
    assert_eq!(count_items_by_task(&pool, task_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn same_platform_id_on_another_platform_is_distinct(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let a = insert_item(&pool, task_id, &raw_item("weibo", "1", "a")).await.unwrap();
    let b = insert_item(&pool, task_id, &raw_item("zhihu", "1", "b")).await.unwrap();
    assert!(a.is_new && b.is_new);
    assert_ne!(a.id, b.id);
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_analysis_replaces_previous_result(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let item = insert_item(&pool, task_id, &raw_item("weibo", "w-1", "x")).await.unwrap();

    upsert_analysis(&pool, &analysis(item.id, Sentiment::Positive, 0.709_090_9))
        .await
        .unwrap();
    let first = get_analysis(&pool, item.id).await.unwrap().unwrap();
    assert_eq!(first.sentiment, "positive");
    assert_eq!(first.score, Decimal::new(7091, 4));
    assert_eq!(first.keywords.0[0].word, "人工智能");

    upsert_analysis(&pool, &analysis(item.id, Sentiment::Negative, 0.3))
        .await
        .unwrap();
    let second = get_analysis(&pool, item.id).await.unwrap().unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.sentiment, "negative");
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_analysis_for_missing_item_fails(pool: sqlx::PgPool) {
    let result = upsert_analysis(&pool, &analysis(12_345, Sentiment::Neutral, 0.5)).await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}

// ---------------------------------------------------------------------------
// Crawl jobs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn crawl_job_follows_lifecycle(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let mut job = create_crawl_job(&pool, task_id, "weibo")
        .await
        .unwrap()
        .into_crawl_job()
        .unwrap();
    assert_eq!(job.status, JobStatus::Pending);

    job.status = JobStatus::Running;
    update_crawl_job(&pool, &job).await.unwrap();

    job.total_collected = 5;
    job.newly_stored = 4;
    job.duplicates = 1;
    update_crawl_job(&pool, &job).await.unwrap();

    job.status = JobStatus::Completed;
    job.completed_at = Some(Utc::now());
    update_crawl_job(&pool, &job).await.unwrap();

    let stored = get_crawl_job(&pool, job.id).await.unwrap();
    assert_eq!(stored.status, "completed");
    assert_eq!(stored.newly_stored, 4);
    assert!(stored.started_at.is_some());
    assert!(stored.completed_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn crawl_job_cannot_finalize_twice(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let mut job = create_crawl_job(&pool, task_id, "zhihu")
        .await
        .unwrap()
        .into_crawl_job()
        .unwrap();

    job.status = JobStatus::Running;
    update_crawl_job(&pool, &job).await.unwrap();
    job.status = JobStatus::Failed;
    job.error_message = Some("zhihu: rate limited".to_string());
    update_crawl_job(&pool, &job).await.unwrap();

    job.status = JobStatus::Completed;
    let err = update_crawl_job(&pool, &job).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::InvalidCrawlJobTransition { expected_status: "running", .. }
    ));
    assert_eq!(get_crawl_job(&pool, job.id).await.unwrap().status, "failed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn pending_job_cannot_complete_directly(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let mut job = create_crawl_job(&pool, task_id, "weibo")
        .await
        .unwrap()
        .into_crawl_job()
        .unwrap();
    job.status = JobStatus::Completed;
    assert!(update_crawl_job(&pool, &job).await.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
async fn progress_reflects_latest_job(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;

    let idle = get_task_progress(&pool, task_id).await.unwrap();
    assert_eq!(idle.status, "idle");
    assert_eq!(idle.progress, 0);

    let mut job = create_crawl_job(&pool, task_id, "weibo")
        .await
        .unwrap()
        .into_crawl_job()
        .unwrap();
    job.status = JobStatus::Running;
    job.total_collected = 4;
    job.newly_stored = 1;
    job.duplicates = 1;
    update_crawl_job(&pool, &job).await.unwrap();
    insert_item(&pool, task_id, &raw_item("weibo", "p-1", "x")).await.unwrap();

    let progress = get_task_progress(&pool, task_id).await.unwrap();
    assert_eq!(progress.status, "running");
    assert_eq!(progress.total_items, 1);
    assert_eq!(progress.progress, 50);
    assert_eq!(list_crawl_jobs(&pool, task_id, 10).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn aggregate_counts_sentiments_per_day(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let labels = [
        ("a", Sentiment::Positive, 0.8),
        ("b", Sentiment::Positive, 0.6),
        ("c", Sentiment::Negative, 0.2),
    ];
    for (id, sentiment, score) in labels {
        let item = insert_item(&pool, task_id, &raw_item("weibo", id, "x")).await.unwrap();
        upsert_analysis(&pool, &analysis(item.id, sentiment, score)).await.unwrap();
    }

    assert_eq!(aggregate_sentiment_stats(&pool, task_id).await.unwrap(), 1);
    // Re-aggregating updates the same row.
    assert_eq!(aggregate_sentiment_stats(&pool, task_id).await.unwrap(), 1);

    let stats = list_sentiment_stats(&pool, task_id, 30).await.unwrap();
    assert_eq!(stats.len(), 1);
    let day = &stats[0];
    assert_eq!(day.stat_date.to_string(), "2026-03-01");
    assert_eq!(day.positive_count, 2);
    assert_eq!(day.neutral_count, 0);
    assert_eq!(day.negative_count, 1);
    assert_eq!(day.avg_score, Some(Decimal::new(5333, 4)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn stats_between_keeps_only_days_in_range(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    for (id, day) in [("d1", 1), ("d5", 5), ("d9", 9)] {
        let mut item = raw_item("weibo", id, "x");
        item.published_at = Some(Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap());
        let stored = insert_item(&pool, task_id, &item).await.unwrap();
        upsert_analysis(&pool, &analysis(stored.id, Sentiment::Neutral, 0.5))
            .await
            .unwrap();
    }
    assert_eq!(aggregate_sentiment_stats(&pool, task_id).await.unwrap(), 3);

    let from = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
    let days: Vec<String> = list_sentiment_stats_between(&pool, task_id, from, to)
        .await
        .unwrap()
        .iter()
        .map(|r| r.stat_date.to_string())
        .collect();
    assert_eq!(days, vec!["2026-03-01", "2026-03-05"]);
}

// ---------------------------------------------------------------------------
// Item listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_items_joins_analysis_newest_first(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let other_task = insert_test_task(&pool, "新能源").await;

    let mut ids = Vec::new();
    for (platform_id, hour) in [("old", 1), ("new", 9), ("mid", 5)] {
        let mut item = raw_item("weibo", platform_id, "内容");
        item.published_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap());
        ids.push(insert_item(&pool, task_id, &item).await.unwrap().id);
    }
    let mut undated = raw_item("zhihu", "undated", "内容");
    undated.published_at = None;
    insert_item(&pool, task_id, &undated).await.unwrap();
    insert_item(&pool, other_task, &raw_item("weibo", "elsewhere", "x"))
        .await
        .unwrap();

    // Only "new" is analyzed.
    upsert_analysis(&pool, &analysis(ids[1], Sentiment::Positive, 0.8))
        .await
        .unwrap();

    let page = list_items_by_task(&pool, task_id, 10, 0).await.unwrap();
    let order: Vec<&str> = page.iter().map(|r| r.platform_id.as_str()).collect();
    assert_eq!(order, vec!["new", "mid", "old", "undated"]);
    assert_eq!(page[0].sentiment.as_deref(), Some("positive"));
    assert_eq!(page[0].score, Some(Decimal::new(8000, 4)));
    assert_eq!(page[0].keywords.as_ref().unwrap().0[0].word, "人工智能");
    assert!(page[1].sentiment.is_none());
    assert!(page[1].keywords.is_none());

    let second = list_items_by_task(&pool, task_id, 2, 2).await.unwrap();
    let order: Vec<&str> = second.iter().map(|r| r.platform_id.as_str()).collect();
    assert_eq!(order, vec!["old", "undated"]);
}

// ---------------------------------------------------------------------------
// PgStore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn pg_store_reports_repeats_and_bad_transitions(pool: sqlx::PgPool) {
    let task_id = insert_test_task(&pool, "人工智能").await;
    let store = PgStore::new(pool.clone());
    let item = raw_item("weibo", "s-1", "人工智能很好");

    assert!(!store.is_known("weibo", "s-1").await.unwrap());
    assert!(store.save_item(task_id, &item).await.unwrap().is_new);
    assert!(store.is_known("weibo", "s-1").await.unwrap());
    assert!(!store.save_item(task_id, &item).await.unwrap().is_new);

    let mut job = store.create_job(task_id, "weibo").await.unwrap();
    job.status = JobStatus::Completed;
    let err = store.update_job(&job).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidTransition { .. }));
}
