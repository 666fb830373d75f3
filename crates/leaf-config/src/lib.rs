//! # leaf-config
//!
//! Layered configuration loading for Leaf using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LEAF_*` prefix, `__` as separator)
//! 2. Project-level `.leaf/config.toml`
//! 3. User-level `~/.config/leaf/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LEAF_TIMER__TICK_INTERVAL_MS` -> `timer.tick_interval_ms`,
//! `LEAF_STORAGE__DATA_DIR` -> `storage.data_dir`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use leaf_config::LeafConfig;
//!
//! let config = LeafConfig::load_with_dotenv().expect("config");
//! println!("tick every {:?}", config.timer.tick_interval());
//! ```

mod error;
mod general;
mod storage;
mod timer;

pub use error::ConfigError;
pub use general::{GeneralConfig, MAX_DAILY_TOTALS_DAYS};
pub use storage::StorageConfig;
pub use timer::TimerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeafConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl LeafConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`LeafConfig::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value is invalid.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        // A missing .env file is the common case.
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".leaf/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("LEAF_").split("__"))
    }

    /// Check cross-field constraints after extraction.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for values the runtime cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timer.validate()?;
        self.general.validate()?;
        if self.storage.sessions_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.sessions_key".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("leaf").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn default_config_loads() {
        let config = LeafConfig::default();
        assert_eq!(config.timer.tick_interval_ms, 1_000);
        assert_eq!(config.storage.sessions_key, "sessions");
        assert_eq!(config.general.daily_totals_days, 7);
        config.validate().unwrap();
    }

    #[test]
    fn env_overrides_nested_values() {
        Jail::expect_with(|jail| {
            jail.set_env("LEAF_TIMER__SNAPSHOT_DEBOUNCE_MS", "250");
            jail.set_env("LEAF_STORAGE__SESSIONS_KEY", "reading_sessions");
            let config: LeafConfig = LeafConfig::figment().extract()?;
            assert_eq!(config.timer.snapshot_debounce_ms, 250);
            assert_eq!(config.timer.tick_interval_ms, 1_000);
            assert_eq!(config.storage.sessions_key, "reading_sessions");
            Ok(())
        });
    }

    #[test]
    fn project_file_is_merged_below_env() {
        Jail::expect_with(|jail| {
            std::fs::create_dir(jail.directory().join(".leaf")).map_err(|e| e.to_string())?;
            jail.create_file(
                ".leaf/config.toml",
                r#"
                [timer]
                tick_interval_ms = 500
                transition_quiet_ms = 2000

                [general]
                daily_totals_days = 30
                "#,
            )?;
            jail.set_env("LEAF_TIMER__TICK_INTERVAL_MS", "750");
            let config: LeafConfig = LeafConfig::figment().extract()?;
            assert_eq!(config.timer.tick_interval_ms, 750);
            assert_eq!(config.timer.transition_quiet_ms, 2_000);
            assert_eq!(config.general.daily_totals_days, 30);
            Ok(())
        });
    }

    #[test]
    fn load_rejects_zero_tick() {
        Jail::expect_with(|jail| {
            jail.set_env("LEAF_TIMER__TICK_INTERVAL_MS", "0");
            assert!(matches!(
                LeafConfig::load(),
                Err(ConfigError::InvalidValue { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn load_rejects_huge_daily_totals_window() {
        Jail::expect_with(|jail| {
            jail.set_env("LEAF_GENERAL__DAILY_TOTALS_DAYS", "4294967295");
            assert!(matches!(
                LeafConfig::load(),
                Err(ConfigError::InvalidValue { field, .. }) if field == "general.daily_totals_days"
            ));
            Ok(())
        });
    }
}
