//! Timer error types.

use leaf_core::enums::TimerStatus;
use leaf_store::LifecycleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerError {
    /// The requested action is not valid from the timer's current state.
    #[error("Invalid timer transition from {from} to {to}")]
    InvalidTransition { from: TimerStatus, to: TimerStatus },

    /// Opening or closing the session record failed.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}
