//! Advisory duplicate check ahead of storage.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use yuqing_core::Store;

/// Answers "has this `(platform, platform_id)` already been stored?"
///
/// Only saves work. Under concurrency two runs can both see `false` for the
/// same pair; `Store::save_item` settles the race. Pairs seen by this process
/// are cached so repeat runs skip the store round-trip.
pub struct DeduplicationGate {
    store: Arc<dyn Store>,
    seen: Mutex<HashSet<(String, String)>>,
}

impl DeduplicationGate {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// A lookup failure counts as "not known" and lets the store decide.
    pub async fn is_known(&self, platform: &str, platform_id: &str) -> bool {
        if self.cached(platform, platform_id) {
            return true;
        }

        match self.store.is_known(platform, platform_id).await {
            Ok(true) => {
                self.remember(platform, platform_id);
                true
            }
            Ok(false) => false,
            Err(e) => {
                tracing::warn!(
                    platform,
                    platform_id,
                    error = %e,
                    "dedup lookup failed, deferring to store"
                );
                false
            }
        }
    }

    /// Records a pair the store has confirmed exists.
    pub fn remember(&self, platform: &str, platform_id: &str) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((platform.to_string(), platform_id.to_string()));
    }

    fn cached(&self, platform: &str, platform_id: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(platform.to_string(), platform_id.to_string()))
    }
}
