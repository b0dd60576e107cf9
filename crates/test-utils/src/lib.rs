//! Shared test utilities for the geolayer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic `.shp` / `.dbf` byte builders
//! - Well-known `.prj` WKT fixtures
//! - Helpers for writing complete layer datasets into a directory
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod shapefiles;
pub mod wkt;

// Re-export commonly used items at the crate root
pub use shapefiles::*;
pub use wkt::*;

/// Create a temporary directory for a test data tree.
pub fn temp_data_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}
