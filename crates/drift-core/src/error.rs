//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `DriftError` as one
//! variant where they need to surface core failures.

use thiserror::Error;

/// The top-level error type for `drift-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `drift-*` crates.
pub type DriftResult<T> = Result<T, DriftError>;
