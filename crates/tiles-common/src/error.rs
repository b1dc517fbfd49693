//! Error and status types for map rendering.

use std::fmt;
use thiserror::Error;

/// Result type alias using TilesError.
pub type TilesResult<T> = Result<T, TilesError>;

/// Primary error type for map operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilesError {
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),

    #[error("Data source error: {0}")]
    DataSourceError(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl TilesError {
    /// The status code corresponding to this error.
    pub fn status(&self) -> Status {
        match self {
            TilesError::OutOfMemory(_) => Status::OutOfMemory,
            TilesError::ProjectionError(_) => Status::ProjectionError,
            TilesError::DataSourceError(_) => Status::DataSourceError,
            TilesError::RenderError(_) => Status::RenderError,
            TilesError::InvalidState(_) => Status::InvalidState,
        }
    }

    /// The human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            TilesError::OutOfMemory(msg)
            | TilesError::ProjectionError(msg)
            | TilesError::DataSourceError(msg)
            | TilesError::RenderError(msg)
            | TilesError::InvalidState(msg) => msg,
        }
    }
}

/// Outcome of the last operation that touched a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Ok,
    OutOfMemory,
    ProjectionError,
    DataSourceError,
    RenderError,
    InvalidState,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::OutOfMemory => "out of memory",
            Status::ProjectionError => "projection error",
            Status::DataSourceError => "data source error",
            Status::RenderError => "render error",
            Status::InvalidState => "invalid state",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
