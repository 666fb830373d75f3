//! Storage and lifecycle error types for leaf-store.

use leaf_core::errors::CoreError;
use thiserror::Error;

/// Errors from the key-value backends and the session repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a stored blob failed.
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized for storage.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key cannot be mapped onto the backend (e.g., it is empty).
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    /// An in-memory lock was poisoned by a panicking writer.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from session lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The user already has an open session; only one may be open at a time.
    #[error("User {user_id} already has an open session: {session_id}")]
    SessionAlreadyOpen { user_id: String, session_id: String },

    /// Persisting the session history failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// ID generation or another core operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}
