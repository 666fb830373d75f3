//! General application configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for `daily_totals_days` (about ten years).
pub const MAX_DAILY_TOTALS_DAYS: u32 = 3_660;

/// Default number of days in the daily-totals history.
const fn default_daily_totals_days() -> u32 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Number of calendar days returned by the daily-totals view.
    #[serde(default = "default_daily_totals_days")]
    pub daily_totals_days: u32,
}

impl GeneralConfig {
    /// Reject values the runtime cannot use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `daily_totals_days` exceeds
    /// [`MAX_DAILY_TOTALS_DAYS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daily_totals_days > MAX_DAILY_TOTALS_DAYS {
            return Err(ConfigError::InvalidValue {
                field: "general.daily_totals_days".into(),
                reason: format!("must be at most {MAX_DAILY_TOTALS_DAYS}"),
            });
        }
        Ok(())
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            daily_totals_days: default_daily_totals_days(),
        }
    }
}
