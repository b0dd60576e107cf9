//! Coordinate reference system transformations.
//!
//! Implements map projections from scratch without external dependencies.
//! The supported projections cover the CRS families found in `.prj` files of
//! US vector datasets: geographic coordinates, state-plane Lambert Conformal
//! Conic zones, UTM / state-plane Transverse Mercator zones, and Web
//! Mercator.

pub mod ellipsoid;
pub mod lambert;
pub mod mercator;
pub mod transverse;
pub mod wkt;

pub use ellipsoid::Ellipsoid;
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use transverse::TransverseMercator;
pub use wkt::parse_wkt;

use thiserror::Error;

/// Result type alias using ProjectionError.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while interpreting a CRS definition.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Invalid WKT: {0}")]
    InvalidWkt(String),

    #[error("Unsupported projection: {0}")]
    UnsupportedProjection(String),

    #[error("Missing projection parameter: {0}")]
    MissingParameter(String),
}

/// A source CRS resolved from a dataset's `.prj` definition.
///
/// Every variant transforms between its native map coordinates and WGS84
/// geographic coordinates (longitude/latitude degrees). The pipeline only
/// needs the inverse direction; the forward direction exists so transforms
/// can be verified by round-trip.
#[derive(Debug, Clone)]
pub enum SourceProjection {
    /// Coordinates are already longitude/latitude degrees.
    Geographic,
    WebMercator(WebMercator),
    LambertConformal(LambertConformal),
    TransverseMercator(TransverseMercator),
}

impl SourceProjection {
    /// Convert native map coordinates to (longitude, latitude) degrees.
    pub fn to_lon_lat(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            SourceProjection::Geographic => (x, y),
            SourceProjection::WebMercator(p) => p.unproject(x, y),
            SourceProjection::LambertConformal(p) => p.unproject(x, y),
            SourceProjection::TransverseMercator(p) => p.unproject(x, y),
        }
    }

    /// Convert (longitude, latitude) degrees to native map coordinates.
    pub fn from_lon_lat(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            SourceProjection::Geographic => (lon, lat),
            SourceProjection::WebMercator(p) => p.project(lon, lat),
            SourceProjection::LambertConformal(p) => p.project(lon, lat),
            SourceProjection::TransverseMercator(p) => p.project(lon, lat),
        }
    }

    /// True when no coordinate conversion is needed.
    pub fn is_geographic(&self) -> bool {
        matches!(self, SourceProjection::Geographic)
    }
}
