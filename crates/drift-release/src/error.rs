use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("release file parse error: {0}")]
    Parse(String),

    #[error("release file header must name `x,y[,z]` or `lon,lat[,depth]` columns, got `{0}`")]
    UnknownLayout(String),

    #[error("zone `{key}`: placed {placed} of {requested} agents before giving up")]
    ZoneTooSparse { key: String, placed: usize, requested: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReleaseResult<T> = Result<T, ReleaseError>;
