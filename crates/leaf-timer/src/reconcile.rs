//! Elapsed-time reconciliation from a persisted snapshot.
//!
//! No ticks run while the process is suspended, so on resume the counter is
//! rebuilt from the last snapshot and the wall-clock time since it was taken.

use chrono::{DateTime, Utc};
use leaf_core::calendar::whole_seconds_between;
use leaf_core::entities::TimerSnapshot;
use leaf_core::enums::TimerStatus;

/// Timer state recovered from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub session_seconds: u64,
    pub status: TimerStatus,
}

/// Rebuild the counter from `snapshot` as of `now`.
///
/// A ticking snapshot gains the whole seconds since `lastUpdateTime`, never a
/// negative amount. A paused snapshot keeps its seconds unchanged.
#[must_use]
pub fn reconcile(snapshot: &TimerSnapshot, now: DateTime<Utc>) -> Reconciled {
    if snapshot.is_ticking() {
        let elapsed = whole_seconds_between(snapshot.last_update_time, now);
        Reconciled {
            session_seconds: snapshot.session_seconds.saturating_add(elapsed),
            status: TimerStatus::Running,
        }
    } else {
        Reconciled {
            session_seconds: snapshot.session_seconds,
            status: TimerStatus::Paused,
        }
    }
}
