use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unknown advection scheme `{0}` (expected `euler` or `rk4`)")]
    UnknownScheme(String),

    #[error("unknown coastline behavior `{0}` (expected none, beaching, standstill or bouncing)")]
    UnknownPolicy(String),
}

pub type TransportResult<T> = Result<T, TransportError>;
