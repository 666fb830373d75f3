//! Facade error type.

use leaf_config::ConfigError;
use leaf_store::{LifecycleError, StoreError};
use leaf_timer::TimerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Timer(#[from] TimerError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
