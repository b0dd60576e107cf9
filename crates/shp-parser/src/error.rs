//! Error types for shapefile parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for shapefile parser operations.
pub type ShpResult<T> = Result<T, ShpError>;

/// Error types for shapefile parsing.
#[derive(Debug, Error)]
pub enum ShpError {
    /// File I/O error, with the path that failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed `.shp` geometry file.
    #[error("Invalid shapefile: {0}")]
    InvalidShp(String),

    /// Malformed `.dbf` attribute table.
    #[error("Invalid attribute table: {0}")]
    InvalidDbf(String),

    /// Shape type outside the supported set.
    #[error("Unsupported shape type: {0}")]
    UnsupportedShapeType(i32),
}
