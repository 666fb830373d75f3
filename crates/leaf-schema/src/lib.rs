//! # leaf-schema
//!
//! JSON Schema generation, validation, and registry for Leaf.
//!
//! Entity types are defined in `leaf-core` with `#[derive(JsonSchema)]`.
//! This crate builds their schemas once and validates stored JSON blobs
//! against them before they are deserialized, so a blob with the wrong shape
//! is rejected as a whole instead of being half-trusted.

pub mod error;
pub mod registry;

pub use error::SchemaError;
pub use registry::{
    DAILY_TOTAL, READING_SESSION, READING_SESSION_LIST, READING_STATS, SchemaRegistry,
    TIMER_SNAPSHOT, TODAY_STATS,
};
