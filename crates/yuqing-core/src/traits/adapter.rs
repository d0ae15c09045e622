//! Platform adapter trait for per-platform content sources.

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::types::RawItem;

/// Fetches raw items for a keyword from one platform.
///
/// Implementations own nothing beyond the items they return. Login flows,
/// paging, and rate-limit handling for a live site stay inside the adapter.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Returns at most `max_results` items matching `keyword`, in the order
    /// the platform yielded them.
    async fn search(&self, keyword: &str, max_results: usize)
        -> Result<Vec<RawItem>, AdapterError>;
}
