//! Timer configuration: tick rate, snapshot debounce, and transition quiet window.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_snapshot_debounce_ms() -> u64 {
    100
}

const fn default_transition_quiet_ms() -> u64 {
    1_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimerConfig {
    /// Period of the foreground tick that refreshes the elapsed-seconds counter.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Snapshot writes requested within this window are coalesced into one.
    #[serde(default = "default_snapshot_debounce_ms")]
    pub snapshot_debounce_ms: u64,

    /// Snapshot writes are suppressed for this long after a suspend/resume transition.
    #[serde(default = "default_transition_quiet_ms")]
    pub transition_quiet_ms: u64,
}

impl TimerConfig {
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[must_use]
    pub const fn snapshot_debounce(&self) -> Duration {
        Duration::from_millis(self.snapshot_debounce_ms)
    }

    #[must_use]
    pub const fn transition_quiet(&self) -> Duration {
        Duration::from_millis(self.transition_quiet_ms)
    }

    /// Reject values the timer cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero tick interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timer.tick_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            snapshot_debounce_ms: default_snapshot_debounce_ms(),
            transition_quiet_ms: default_transition_quiet_ms(),
        }
    }
}
