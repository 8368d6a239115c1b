//! Field-subsystem error types.

use thiserror::Error;

use drift_core::{GeoPoint, GridPos};

/// Errors produced by dataset access.
///
/// `OutOfDomain` is not a failure of the run: callers that move agents turn
/// it into an out-of-domain death and carry on with the rest of the
/// population.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("position {0} is outside the grid")]
    OutOfDomain(GridPos),

    #[error("geographic point {0} is outside the grid")]
    GeoOutOfDomain(GeoPoint),

    #[error("unknown field variable `{0}`")]
    UnknownVariable(String),

    #[error("invalid grid: {0}")]
    InvalidGrid(String),
}

impl FieldError {
    /// `true` for the domain-exit signals (grid or geographic).
    pub fn is_out_of_domain(&self) -> bool {
        matches!(self, FieldError::OutOfDomain(_) | FieldError::GeoOutOfDomain(_))
    }
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Errors raised while initialising a zone.
#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("zone `{key}` needs at least 3 vertices, got {count}")]
    TooFewVertices { key: String, count: usize },

    #[error("zone `{key}`: lower depth {lower} m is above upper depth {upper} m")]
    InvertedDepthBand { key: String, upper: f64, lower: f64 },

    #[error("zone `{key}`: offshore line {offshore} m is shallower than inshore line {inshore} m")]
    InvertedBathyBand { key: String, inshore: f64, offshore: f64 },

    #[error("zone `{key}`: vertex {index} does not resolve to the grid: {source}")]
    VertexOutOfDomain {
        key: String,
        index: usize,
        #[source]
        source: FieldError,
    },
}
