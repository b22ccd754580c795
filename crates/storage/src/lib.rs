//! File storage collaborator for panicguard.
//!
//! Backends implement [`FileStorage`] and report failures as
//! [`StorageError`]s refining a [`Sentinel`](panicguard_core::Sentinel).
//! The HTTP layer wraps them into faults before they reach a boundary.

pub mod config;
pub mod error;
pub mod memory;
pub mod query;
pub mod registry;
pub mod store;

pub use config::StorageConfig;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use query::{Projection, Query, QueryField};
pub use registry::StorageRegistry;
pub use store::{FileInfo, FileStorage, Folder};
