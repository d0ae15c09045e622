//! Shared domain types, collaborator contracts, and configuration for the
//! yuqing keyword-monitoring pipeline.

pub mod app_config;
pub mod config;
pub mod error;
pub mod job;
pub mod tasks;
pub mod traits;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{AdapterCause, AdapterError, ConfigError, StoreError};
pub use job::{CrawlJob, JobStatus};
pub use tasks::{load_tasks, TaskConfig, TaskStatus, TasksFile};
pub use traits::{PlatformAdapter, SaveOutcome, Store};
pub use types::{
    AnalysisResult, CollectionFailure, CollectionResult, CollectionSummary, Keyword,
    MonitoringTask, RawItem, Sentiment, SentimentScore, StoredItem,
};
