//! Collection pipeline: drives platform adapters for a monitoring task,
//! deduplicates and persists what they return, analyzes each new item, and
//! tracks every `(task, platform)` run as a crawl job.

pub mod coordinator;
pub mod error;
pub mod gate;
pub mod memory;
pub mod mock;
pub mod registry;
pub mod tracker;

pub use coordinator::{CollectionCoordinator, CoordinatorConfig, PlatformRun};
pub use error::CollectError;
pub use gate::DeduplicationGate;
pub use memory::MemoryStore;
pub use mock::{MockDataAdapter, DEFAULT_MOCK_SEED};
pub use registry::{collect_registered, AdapterRegistry};
pub use tracker::JobStatusTracker;
