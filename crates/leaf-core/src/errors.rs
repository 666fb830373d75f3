//! Cross-cutting error types for Leaf.
//!
//! Domain-specific errors (e.g., `StoreError`, `TimerError`) are defined in
//! their respective crates. A unified `TrackerError` is deferred to the `leaf`
//! facade where all crate errors converge.

use thiserror::Error;

/// Errors that can be raised by any Leaf crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
