//! Monitoring-task seed file (`config/tasks.yaml`).

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Paused,
    Completed,
}

impl TaskStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Paused => "paused",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TaskStatus::Active),
            "paused" => Ok(TaskStatus::Paused),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

fn default_status() -> TaskStatus {
    TaskStatus::Active
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub keyword: String,
    pub description: Option<String>,
    pub platforms: Vec<String>,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct TasksFile {
    pub tasks: Vec<TaskConfig>,
}

/// Load and validate monitoring tasks from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tasks(path: &Path) -> Result<TasksFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TasksFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_tasks(&content)
}

fn parse_tasks(content: &str) -> Result<TasksFile, ConfigError> {
    let tasks_file: TasksFile = serde_yaml::from_str(content)?;
    validate_tasks(&tasks_file)?;
    Ok(tasks_file)
}

fn validate_tasks(tasks_file: &TasksFile) -> Result<(), ConfigError> {
    let mut seen_keywords = HashSet::new();

    for task in &tasks_file.tasks {
        let keyword = task.keyword.trim();
        if keyword.is_empty() {
            return Err(ConfigError::Validation(
                "task keyword must be non-empty".to_string(),
            ));
        }

        if task.platforms.is_empty() {
            return Err(ConfigError::Validation(format!(
                "task '{keyword}' must list at least one platform"
            )));
        }

        if task.platforms.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "task '{keyword}' has an empty platform name"
            )));
        }

        if !seen_keywords.insert(keyword.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate task keyword: '{keyword}'"
            )));
        }
    }

    Ok(())
}
