//! Platform name to adapter lookup, and collection over a task's platforms.

use std::collections::HashMap;
use std::sync::Arc;

use yuqing_core::{CollectionResult, MonitoringTask, PlatformAdapter};

use crate::coordinator::{CollectionCoordinator, PlatformRun};
use crate::error::CollectError;
use crate::mock::MockDataAdapter;

#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn PlatformAdapter>>,
    mock_seed: Option<u64>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that answers every platform without an explicit adapter
    /// with a [`MockDataAdapter`] seeded by `seed`.
    #[must_use]
    pub fn mock_all(seed: u64) -> Self {
        Self {
            adapters: HashMap::new(),
            mock_seed: Some(seed),
        }
    }

    /// Replaces any adapter already registered under `platform`.
    pub fn register(&mut self, platform: impl Into<String>, adapter: Arc<dyn PlatformAdapter>) {
        self.adapters.insert(platform.into(), adapter);
    }

    #[must_use]
    pub fn get(&self, platform: &str) -> Option<Arc<dyn PlatformAdapter>> {
        if let Some(adapter) = self.adapters.get(platform) {
            return Some(Arc::clone(adapter));
        }
        self.mock_seed
            .map(|seed| Arc::new(MockDataAdapter::new(platform, seed)) as Arc<dyn PlatformAdapter>)
    }

    /// `true` when no platform can be served.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty() && self.mock_seed.is_none()
    }

    /// Explicitly registered platform names, sorted.
    #[must_use]
    pub fn platforms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Collects `task` from each of `platforms` through `coordinator`.
///
/// A platform without a registered adapter yields a failed result instead of
/// aborting the others. Results keep the order of `platforms`.
///
/// # Errors
///
/// [`CollectError::InvalidInput`] if the coordinator rejects the task or a run.
pub async fn collect_registered(
    coordinator: &CollectionCoordinator,
    registry: &AdapterRegistry,
    task: &MonitoringTask,
    platforms: &[String],
    max_results: usize,
) -> Result<Vec<CollectionResult>, CollectError> {
    let mut slots: Vec<Option<CollectionResult>> = Vec::with_capacity(platforms.len());
    let mut runs = Vec::new();

    for platform in platforms {
        match registry.get(platform) {
            Some(adapter) => {
                runs.push(PlatformRun::new(platform.clone(), adapter, max_results));
                slots.push(None);
            }
            None => {
                let registered = registry.platforms();
                tracing::warn!(
                    task_id = task.id,
                    platform = %platform,
                    ?registered,
                    "no adapter registered"
                );
                slots.push(Some(CollectionResult::failed(
                    platform.clone(),
                    unregistered_message(platform, &registered),
                )));
            }
        }
    }

    let mut collected = coordinator.coordinate(task, runs).await?.into_iter();
    let results = slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| collected.next()))
        .collect();

    Ok(results)
}

fn unregistered_message(platform: &str, registered: &[String]) -> String {
    if registered.is_empty() {
        format!("no adapter registered for platform {platform}")
    } else {
        format!(
            "no adapter registered for platform {platform} (registered: {})",
            registered.join(", ")
        )
    }
}
