//! # leaf-stats
//!
//! Reading statistics for Leaf: lifetime totals, today's progress, per-day
//! history, and calendar-day streaks, all derived from the session history.

pub mod aggregator;
pub mod streak;

pub use aggregator::{StatsAggregator, rounded_minutes};
pub use streak::{Streaks, compute_streaks};
