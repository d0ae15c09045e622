//! Postgres-backed [`Store`] for the collection pipeline.

use async_trait::async_trait;
use sqlx::PgPool;
use yuqing_core::{AnalysisResult, CrawlJob, RawItem, SaveOutcome, Store, StoreError};

use crate::{
    create_crawl_job, insert_item, item_exists, update_crawl_job, upsert_analysis, DbError,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        if err.is_unique_violation() {
            return StoreError::Conflict(err.to_string());
        }
        match err {
            DbError::NotFound => StoreError::NotFound,
            DbError::InvalidCrawlJobTransition {
                id,
                expected_status,
            } => StoreError::InvalidTransition {
                id,
                expected: expected_status,
            },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn is_known(&self, platform: &str, platform_id: &str) -> Result<bool, StoreError> {
        Ok(item_exists(&self.pool, platform, platform_id).await?)
    }

    async fn save_item(&self, task_id: i64, item: &RawItem) -> Result<SaveOutcome, StoreError> {
        let inserted = insert_item(&self.pool, task_id, item).await?;
        Ok(SaveOutcome {
            id: inserted.id,
            is_new: inserted.is_new,
        })
    }

    async fn save_analysis(&self, analysis: &AnalysisResult) -> Result<(), StoreError> {
        upsert_analysis(&self.pool, analysis).await?;
        Ok(())
    }

    async fn create_job(&self, task_id: i64, platform: &str) -> Result<CrawlJob, StoreError> {
        let row = create_crawl_job(&self.pool, task_id, platform).await?;
        Ok(row.into_crawl_job()?)
    }

    async fn update_job(&self, job: &CrawlJob) -> Result<(), StoreError> {
        Ok(update_crawl_job(&self.pool, job).await?)
    }
}
