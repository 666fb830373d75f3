//! Session repository: the full session history plus one timer snapshot per user.
//!
//! A missing, unparsable, or schema-invalid blob is logged and read as "no
//! data". A backend read failure is different: [`SessionRepository::load_all`]
//! reports it, so callers that rewrite the history never mistake an unreadable
//! store for an empty one. [`SessionRepository::read_all`] logs it and reads as
//! empty, for display paths. Writes return `StoreError`.

use std::sync::Mutex;

use leaf_config::StorageConfig;
use leaf_core::entities::{ReadingSession, TimerSnapshot};
use leaf_schema::{READING_SESSION_LIST, SchemaRegistry, TIMER_SNAPSHOT};
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::kv::{KeyValueStore, MemoryStore};

/// Persistence contract used by the lifecycle, timer, and statistics.
///
/// Implementations must be safe to share across tasks; tests substitute an
/// in-memory repository.
pub trait SessionRepository: Send + Sync + 'static {
    /// All stored sessions in stored order. Empty on missing or corrupt data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend itself cannot be read.
    fn load_all(&self) -> Result<Vec<ReadingSession>, StoreError>;

    /// Like [`SessionRepository::load_all`], but a backend failure is logged
    /// and read as empty.
    fn read_all(&self) -> Vec<ReadingSession> {
        self.load_all().unwrap_or_else(|error| {
            tracing::error!(%error, "session history read failed; treating as empty");
            Vec::new()
        })
    }

    /// Replace the full session history in a single write.
    fn write_all(&self, sessions: &[ReadingSession]) -> Result<(), StoreError>;

    /// The user's timer snapshot, if one exists and is valid.
    fn read_snapshot(&self, user_id: &str) -> Option<TimerSnapshot>;

    /// Overwrite the user's timer snapshot.
    fn write_snapshot(&self, user_id: &str, snapshot: &TimerSnapshot) -> Result<(), StoreError>;

    /// Delete the user's timer snapshot. Deleting a missing snapshot is not an error.
    fn clear_snapshot(&self, user_id: &str) -> Result<(), StoreError>;
}

/// `SessionRepository` storing JSON blobs in any [`KeyValueStore`].
///
/// Every blob is validated against its JSON Schema before it is deserialized.
/// Writes are serialized through an internal gate so two writes never
/// interleave on the same backend.
pub struct JsonSessionRepository<S> {
    store: S,
    schema: SchemaRegistry,
    config: StorageConfig,
    write_gate: Mutex<()>,
}

/// Repository over a [`MemoryStore`], used by tests and ephemeral trackers.
pub type MemorySessionRepository = JsonSessionRepository<MemoryStore>;

impl<S: KeyValueStore> JsonSessionRepository<S> {
    /// Create a repository with the default key names.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, &StorageConfig::default())
    }

    /// Create a repository using the key names from `config`.
    #[must_use]
    pub fn with_config(store: S, config: &StorageConfig) -> Self {
        Self {
            store,
            schema: SchemaRegistry::new(),
            config: config.clone(),
            write_gate: Mutex::new(()),
        }
    }

    /// Access the underlying key-value store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Storage key of a user's snapshot.
    #[must_use]
    pub fn snapshot_key(&self, user_id: &str) -> String {
        self.config.snapshot_key(user_id)
    }

    /// Read and decode `key`. Only a backend failure is an error; bad data is
    /// logged and read as `None`.
    fn load<T: DeserializeOwned>(
        &self,
        key: &str,
        schema_name: &str,
    ) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key, %error, "corrupt JSON in storage; treating as empty");
                return Ok(None);
            }
        };

        if let Err(error) = self.schema.validate(schema_name, &value) {
            tracing::warn!(key, %error, "stored blob does not match schema; treating as empty");
            return Ok(None);
        }

        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(error) => {
                tracing::warn!(key, %error, "stored blob failed to deserialize; treating as empty");
                Ok(None)
            }
        }
    }

    fn gated<T>(&self, write: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let _guard = self
            .write_gate
            .lock()
            .map_err(|_| StoreError::LockPoisoned("session repository write gate"))?;
        write()
    }
}

impl MemorySessionRepository {
    /// Repository over a fresh, empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: KeyValueStore + 'static> SessionRepository for JsonSessionRepository<S> {
    fn load_all(&self) -> Result<Vec<ReadingSession>, StoreError> {
        Ok(self
            .load(&self.config.sessions_key, READING_SESSION_LIST)?
            .unwrap_or_default())
    }

    fn write_all(&self, sessions: &[ReadingSession]) -> Result<(), StoreError> {
        let json = serde_json::to_string(sessions)?;
        self.gated(|| self.store.put(&self.config.sessions_key, &json))?;
        tracing::debug!(count = sessions.len(), "session history written");
        Ok(())
    }

    fn read_snapshot(&self, user_id: &str) -> Option<TimerSnapshot> {
        let key = self.snapshot_key(user_id);
        self.load(&key, TIMER_SNAPSHOT).unwrap_or_else(|error| {
            tracing::error!(key, %error, "snapshot read failed; treating as missing");
            None
        })
    }

    fn write_snapshot(&self, user_id: &str, snapshot: &TimerSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string(snapshot)?;
        let key = self.snapshot_key(user_id);
        self.gated(|| self.store.put(&key, &json))
    }

    fn clear_snapshot(&self, user_id: &str) -> Result<(), StoreError> {
        let key = self.snapshot_key(user_id);
        self.gated(|| self.store.remove(&key).map(|_| ()))
    }
}
