//! `stats`: re-aggregates and prints daily sentiment counts for a task.

pub(crate) async fn run_stats(pool: &sqlx::PgPool, task_id: i64, days: i64) -> anyhow::Result<()> {
    let task = yuqing_db::get_task(pool, task_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("task {task_id} not found"))?;

    yuqing_db::aggregate_sentiment_stats(pool, task_id).await?;
    let rows = yuqing_db::list_sentiment_stats(pool, task_id, days.max(1)).await?;
    let progress = yuqing_db::get_task_progress(pool, task_id).await?;

    println!(
        "task {} \"{}\" [{}]: {} item(s), last job {} ({}%)",
        task.id, task.keyword, task.status, progress.total_items, progress.status, progress.progress
    );

    if rows.is_empty() {
        println!("no analyzed items yet");
        return Ok(());
    }

    println!("{:<12} {:>8} {:>8} {:>8} {:>9}", "date", "positive", "neutral", "negative", "avg");
    for row in &rows {
        let avg = row
            .avg_score
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>9}",
            row.stat_date.to_string(),
            row.positive_count,
            row.neutral_count,
            row.negative_count,
            avg
        );
    }
    Ok(())
}
