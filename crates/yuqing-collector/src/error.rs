use thiserror::Error;

/// Errors surfaced synchronously to the caller of a collection.
///
/// Platform-level failures are not errors at this level; they come back as
/// failed [`CollectionResult`](yuqing_core::CollectionResult) entries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
