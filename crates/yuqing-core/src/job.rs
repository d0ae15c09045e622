//! Crawl job records and their lifecycle.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `pending → running → {completed | failed}`. No transition skips `running`
/// and terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    #[must_use]
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed | JobStatus::Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// The tracked record of one `(task_id, platform)` collection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlJob {
    /// Assigned by the store when the job is created.
    pub id: i64,
    pub task_id: i64,
    pub platform: String,
    pub status: JobStatus,
    pub total_collected: i32,
    pub newly_stored: i32,
    pub duplicates: i32,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CrawlJob {
    #[must_use]
    pub fn pending(id: i64, task_id: i64, platform: impl Into<String>) -> Self {
        Self {
            id,
            task_id,
            platform: platform.into(),
            status: JobStatus::Pending,
            total_collected: 0,
            newly_stored: 0,
            duplicates: 0,
            error_message: None,
            started_at: None,
            completed_at: None,
        }
    }
}
