use thiserror::Error;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("text cannot be empty")]
    EmptyText,

    /// The analyzer cannot serve requests right now. Callers that only need
    /// analysis as a side effect log this and move on.
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    #[error("analysis service returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid analysis response: {0}")]
    InvalidResponse(String),
}
