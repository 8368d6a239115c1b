use drift_agent::{AgentError, Axis};
use drift_field::FieldError;
use thiserror::Error;

/// A behavior's parameters could not be read.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("missing required parameter `{name}`")]
    Missing { name: String },

    #[error("invalid value `{value}` for parameter `{name}`: {reason}")]
    Invalid { name: String, value: String, reason: String },

    #[error("{0}")]
    Unsupported(String),

    #[error("cannot read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table `{path}`: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error("behavior `{key}`: {source}")]
    Setup {
        key: String,
        #[source]
        source: ParamError,
    },

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("behavior `{key}`: unknown kind `{kind}`")]
    UnknownKind { key: String, kind: String },

    #[error("behavior key `{0}` is configured more than once")]
    DuplicateKey(String),

    #[error("behaviors `{holder}` and `{requester}` both claim exclusive {axis} control")]
    ExclusivityConflict { axis: Axis, holder: String, requester: String },

    #[error("behavior `{key}`: {source}")]
    Failed {
        key: String,
        #[source]
        source: Box<BehaviorError>,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
