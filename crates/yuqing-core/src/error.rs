use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tasks file {path}: {source}")]
    TasksFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tasks file: {0}")]
    TasksFileParse(#[from] serde_yaml::Error),

    #[error("invalid tasks file: {0}")]
    Validation(String),
}

/// Why a platform adapter could not produce items.
#[derive(Debug, Error)]
pub enum AdapterCause {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("rate limited")]
    RateLimited,

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// A platform-level failure. Recoverable at the granularity of one
/// platform run; never propagated across platforms.
#[derive(Debug, Error)]
#[error("{platform}: {cause}")]
pub struct AdapterError {
    pub platform: String,
    pub cause: AdapterCause,
}

impl AdapterError {
    pub fn new(platform: impl Into<String>, cause: AdapterCause) -> Self {
        Self {
            platform: platform.into(),
            cause,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. For items this means
    /// another writer stored the same `(platform, platform_id)` first.
    #[error("uniqueness conflict: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    #[error("crawl job {id} is not in expected status '{expected}'")]
    InvalidTransition { id: i64, expected: &'static str },

    #[error("storage backend error: {0}")]
    Backend(String),
}
