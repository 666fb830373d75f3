//! Central schema registry for all Leaf types.
//!
//! The `SchemaRegistry` builds JSON Schemas from leaf-core types at construction
//! time using [`schemars::schema_for!`] and provides validation via `jsonschema`.

use std::collections::HashMap;

use leaf_core::entities::{DailyTotal, ReadingSession, ReadingStats, TimerSnapshot, TodayStats};
use schemars::schema_for;

use crate::error::SchemaError;

/// Schema name for a single [`ReadingSession`].
pub const READING_SESSION: &str = "reading_session";
/// Schema name for the persisted session history (array of sessions).
pub const READING_SESSION_LIST: &str = "reading_session_list";
/// Schema name for a [`TimerSnapshot`].
pub const TIMER_SNAPSHOT: &str = "timer_snapshot";
/// Schema name for [`ReadingStats`].
pub const READING_STATS: &str = "reading_stats";
/// Schema name for [`TodayStats`].
pub const TODAY_STATS: &str = "today_stats";
/// Schema name for [`DailyTotal`].
pub const DAILY_TOTAL: &str = "daily_total";

/// Central store of all JSON Schemas in the Leaf system.
///
/// Built from leaf-core types via [`schemars::schema_for!`]. Provides lookup
/// by name and validation of arbitrary JSON values against registered schemas.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map, converting the `schemars` output to a
/// `serde_json::Value`. Panics if `serde_json::to_value` fails (should be
/// infallible for valid `schemars` output).
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, serde_json::to_value(schema_for!($ty)).unwrap());
    };
}

impl SchemaRegistry {
    /// Build a new registry containing the persisted and derived entity schemas.
    ///
    /// # Panics
    ///
    /// Panics if `serde_json::to_value` fails on any `schemars`-generated
    /// schema. This is not expected in practice because `schemars` always
    /// produces valid JSON-serialisable output.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Persisted blobs (3) ---
        register!(schemas, READING_SESSION, ReadingSession);
        register!(schemas, READING_SESSION_LIST, Vec<ReadingSession>);
        register!(schemas, TIMER_SNAPSHOT, TimerSnapshot);

        // --- Derived views (3) ---
        register!(schemas, READING_STATS, ReadingStats);
        register!(schemas, TODAY_STATS, TodayStats);
        register!(schemas, DAILY_TOTAL, DailyTotal);

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &serde_json::Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::Generation(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
