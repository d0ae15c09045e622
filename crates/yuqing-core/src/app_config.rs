use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Deployment environment from `YUQING_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Development relaxes API key enforcement.
    #[must_use]
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub tasks_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub collect_max_results: usize,
    pub collect_max_concurrent_platforms: usize,
    pub collect_adapter_timeout_secs: u64,
    pub collect_schedule: String,
    pub collect_use_mock: bool,
    pub nlp_top_k: usize,
    pub nlp_remote_url: Option<String>,
    pub nlp_request_timeout_secs: u64,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("tasks_path", &self.tasks_path)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("collect_max_results", &self.collect_max_results)
            .field(
                "collect_max_concurrent_platforms",
                &self.collect_max_concurrent_platforms,
            )
            .field(
                "collect_adapter_timeout_secs",
                &self.collect_adapter_timeout_secs,
            )
            .field("collect_schedule", &self.collect_schedule)
            .field("collect_use_mock", &self.collect_use_mock)
            .field("nlp_top_k", &self.nlp_top_k)
            .field("nlp_remote_url", &self.nlp_remote_url)
            .field("nlp_request_timeout_secs", &self.nlp_request_timeout_secs)
            .finish()
    }
}
