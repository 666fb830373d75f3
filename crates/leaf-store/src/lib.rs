//! # leaf-store
//!
//! Session persistence and lifecycle for Leaf.
//!
//! The full session history lives under one key as a JSON array; each user's
//! in-progress timer lives under `timer_state_<userId>`. Both are written
//! through a [`KeyValueStore`] backend and validated against their JSON
//! Schemas on read.

pub mod error;
pub mod kv;
pub mod lifecycle;
pub mod repository;

mod test_support;

pub use error::{LifecycleError, StoreError};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use lifecycle::{EndOutcome, SessionLifecycle};
pub use repository::{JsonSessionRepository, MemorySessionRepository, SessionRepository};

/// Repository over a [`FileStore`] data directory.
pub type FileSessionRepository = JsonSessionRepository<FileStore>;
