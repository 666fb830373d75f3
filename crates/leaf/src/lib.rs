//! # leaf
//!
//! Reading session tracker core. [`ReadingTracker`] is the surface the UI
//! talks to: it starts, pauses, resumes, and stops reading sessions through a
//! per-user timer that survives process suspension, and it answers statistics
//! queries over the stored history.
//!
//! ```no_run
//! # async fn demo() -> Result<(), leaf::TrackerError> {
//! let config = leaf::LeafConfig::load_with_dotenv()?;
//! let tracker = leaf::ReadingTracker::open(&config)?;
//!
//! tracker.start_session("user-1", "book-42", 10)?;
//! // ... user reads ...
//! tracker.stop_session("user-1", 31)?;
//!
//! let stats = tracker.get_user_stats("user-1");
//! println!("{} minutes read", stats.total_minutes_read);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod logging;
pub mod tracker;

pub use error::TrackerError;
pub use logging::init_tracing;
pub use tracker::ReadingTracker;

pub use leaf_config::LeafConfig;
pub use leaf_core::entities::{DailyTotal, ReadingSession, ReadingStats, TimerSnapshot, TodayStats};
pub use leaf_core::enums::TimerStatus;
pub use leaf_timer::{StopOutcome, TimerView};
