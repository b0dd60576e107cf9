//! Error types for geolayer services.

use thiserror::Error;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Primary error type for layer operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Requested layer is not in the discovered set. Expected client input,
    /// mapped to 404 at the boundary.
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    /// Dataset file missing, unreadable, or malformed.
    #[error("Failed to read data: {0}")]
    DataReadError(String),

    /// Source CRS missing or unsupported, or the transform itself failed.
    #[error("Projection error: {0}")]
    ProjectionError(String),

    /// Anything that should never happen during normal operation.
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for GeoError {
    fn from(err: std::io::Error) -> Self {
        GeoError::DataReadError(err.to_string())
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::InternalError(format!("JSON error: {}", err))
    }
}
