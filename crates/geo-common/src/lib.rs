//! Common types and utilities shared across geolayer services.

pub mod error;
pub mod feature;
pub mod geometry;

pub use error::{GeoError, GeoResult};
pub use feature::{Feature, FeatureCollection, Properties};
pub use geometry::{Geometry, Position};
