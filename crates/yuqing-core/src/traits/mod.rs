//! Contracts for the collaborators the collection pipeline drives.

pub mod adapter;
pub mod store;

pub use adapter::PlatformAdapter;
pub use store::{SaveOutcome, Store};
