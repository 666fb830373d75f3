//! # leaf-timer
//!
//! Reading timer for Leaf: a per-user state machine that ticks while a
//! session is open, checkpoints itself to a snapshot, and reconciles elapsed
//! time after the process is suspended and resumed.

pub mod error;
pub mod reconcile;
pub mod task;
pub mod timer;

pub use error::TimerError;
pub use reconcile::{Reconciled, reconcile};
pub use task::ScheduledTask;
pub use timer::{ReadingTimer, StopOutcome, TimerView};
