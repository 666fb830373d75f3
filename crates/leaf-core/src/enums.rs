//! Status enums for Leaf.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TimerStatus
// ---------------------------------------------------------------------------

/// Status of a user's reading timer.
///
/// ```text
/// idle → running → paused → running
///                → stopped → idle
///        paused  → stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl TimerStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle => &[Self::Running],
            Self::Running => &[Self::Paused, Self::Stopped],
            Self::Paused => &[Self::Running, Self::Stopped],
            Self::Stopped => &[Self::Idle],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether a session is open while the timer is in this state.
    #[must_use]
    pub const fn has_open_session(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_transitions() {
        assert!(TimerStatus::Idle.can_transition_to(TimerStatus::Running));
        assert!(TimerStatus::Running.can_transition_to(TimerStatus::Paused));
        assert!(TimerStatus::Paused.can_transition_to(TimerStatus::Running));
        assert!(TimerStatus::Running.can_transition_to(TimerStatus::Stopped));
        assert!(TimerStatus::Paused.can_transition_to(TimerStatus::Stopped));
        assert!(TimerStatus::Stopped.can_transition_to(TimerStatus::Idle));
    }

    #[test]
    fn timer_rejects_invalid_transitions() {
        assert!(!TimerStatus::Idle.can_transition_to(TimerStatus::Paused));
        assert!(!TimerStatus::Idle.can_transition_to(TimerStatus::Stopped));
        assert!(!TimerStatus::Running.can_transition_to(TimerStatus::Running));
        assert!(!TimerStatus::Paused.can_transition_to(TimerStatus::Paused));
        assert!(!TimerStatus::Stopped.can_transition_to(TimerStatus::Running));
    }

    #[test]
    fn open_session_states() {
        assert!(!TimerStatus::Idle.has_open_session());
        assert!(TimerStatus::Running.has_open_session());
        assert!(TimerStatus::Paused.has_open_session());
        assert!(!TimerStatus::Stopped.has_open_session());
    }

    #[test]
    fn display_and_serde_agree() {
        for status in [
            TimerStatus::Idle,
            TimerStatus::Running,
            TimerStatus::Paused,
            TimerStatus::Stopped,
        ] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, serde_json::Value::String(status.to_string()));
        }
    }
}
