//! Entity structs for all Leaf domain objects.
//!
//! Each persisted entity maps to a JSON blob in the key-value store. All structs
//! derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON roundtrip and
//! schema validation. Field names are camelCase on the wire.

mod session;
mod snapshot;
mod stats;

pub use session::{ReadingSession, pages_between};
pub use snapshot::TimerSnapshot;
pub use stats::{DailyTotal, ReadingStats, TodayStats};
