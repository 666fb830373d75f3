use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Durable checkpoint of an in-progress session's timer, one per user.
///
/// Overwritten in place while the timer runs and deleted when the session is
/// stopped or discarded. Losing it only undercounts the open session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    /// Elapsed seconds accumulated so far in the open session.
    pub session_seconds: u64,
    pub is_running: bool,
    pub is_paused: bool,
    #[serde(default)]
    pub current_session_id: Option<String>,
    pub start_page: u32,
    #[serde(default)]
    pub selected_book_id: Option<String>,
    /// When this snapshot was written; reconciliation measures from here.
    pub last_update_time: DateTime<Utc>,
}

impl TimerSnapshot {
    /// Whether time kept passing for this session after the snapshot was taken.
    #[must_use]
    pub const fn is_ticking(&self) -> bool {
        self.is_running && !self.is_paused
    }
}
