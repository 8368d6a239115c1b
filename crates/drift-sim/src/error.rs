use drift_behavior::BehaviorError;
use drift_core::DriftError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] DriftError),

    #[error("cannot start the worker pool: {0}")]
    ThreadPool(String),

    #[error("simulation aborted: {0}")]
    Behavior(#[from] BehaviorError),
}

pub type SimResult<T> = Result<T, SimError>;
