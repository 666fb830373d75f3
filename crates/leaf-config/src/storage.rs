//! Storage configuration: where the JSON blobs live and what they are called.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_sessions_key() -> String {
    "sessions".to_string()
}

fn default_snapshot_key_prefix() -> String {
    "timer_state_".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding one `<key>.json` file per stored blob.
    /// Defaults to the platform data directory (`~/.local/share/leaf` on Linux).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Key of the session history blob.
    #[serde(default = "default_sessions_key")]
    pub sessions_key: String,

    /// Prefix of the per-user timer snapshot key (`<prefix><user_id>`).
    #[serde(default = "default_snapshot_key_prefix")]
    pub snapshot_key_prefix: String,
}

impl StorageConfig {
    /// Resolve the data directory, falling back to the platform default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDataDir` if nothing is configured and the
    /// platform has no data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|p| p.join("leaf"))
            .ok_or(ConfigError::NoDataDir)
    }

    /// Storage key for a user's timer snapshot.
    #[must_use]
    pub fn snapshot_key(&self, user_id: &str) -> String {
        format!("{}{user_id}", self.snapshot_key_prefix)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            sessions_key: default_sessions_key(),
            snapshot_key_prefix: default_snapshot_key_prefix(),
        }
    }
}
