//! Agent-subsystem error type.

use std::fmt;

use thiserror::Error;

use drift_field::FieldError;

/// A displacement axis for exclusivity arbitration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical   => "vertical",
        })
    }
}

/// Errors produced by `drift-agent`.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A second exclusive displacement was requested on an axis already
    /// claimed this step.  Always fatal: it means two behaviors of the same
    /// pipeline both want to own the axis.
    #[error("exclusive {axis} displacement already claimed this step")]
    ExclusivityViolation { axis: Axis },

    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type AgentResult<T> = Result<T, AgentError>;
