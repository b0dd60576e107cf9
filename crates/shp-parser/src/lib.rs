//! Shapefile reader (ESRI Shapefile Technical Description, July 1998).
//!
//! This crate provides a pure Rust implementation for reading shapefile
//! datasets: the `.shp` geometry file, the `.dbf` attribute table, and the
//! `.prj` CRS definition. Geometries come out as GeoJSON geometry objects in
//! the dataset's native coordinate system; reprojection is the caller's
//! concern.

pub mod dbf;
pub mod error;
pub mod shp;

pub use dbf::{DbfField, DbfTable};
pub use error::{ShpError, ShpResult};

use std::fs;
use std::path::Path;

use geo_common::feature::Properties;
use geo_common::geometry::Geometry;
use tracing::debug;

/// A shapefile dataset loaded into memory: one geometry and one attribute
/// record per feature, index-aligned, plus the raw `.prj` text if present.
#[derive(Debug, Clone)]
pub struct ShpDataset {
    pub shapes: Vec<Option<Geometry>>,
    pub records: Vec<Properties>,
    /// Contents of the `.prj` companion, if the file exists.
    pub wkt: Option<String>,
}

impl ShpDataset {
    /// Open the dataset rooted at a `.shp` path, reading the geometry file
    /// and its `.dbf` companion (required) and `.prj` companion (optional).
    pub fn open<P: AsRef<Path>>(path: P) -> ShpResult<Self> {
        let path = path.as_ref();

        let shapes = shp::read_shapes(&read_file(path)?)?;

        let dbf_path = path.with_extension("dbf");
        let table = dbf::read_table(&read_file(&dbf_path)?)?;
        if table.records.len() != shapes.len() {
            return Err(ShpError::InvalidDbf(format!(
                "attribute table has {} records but geometry file has {} shapes",
                table.records.len(),
                shapes.len()
            )));
        }

        let prj_path = path.with_extension("prj");
        let wkt = match fs::read_to_string(&prj_path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(ShpError::Io {
                    path: prj_path,
                    source,
                })
            }
        };

        debug!(
            path = %path.display(),
            features = shapes.len(),
            has_prj = wkt.is_some(),
            "Loaded shapefile dataset"
        );

        Ok(Self {
            shapes,
            records: table.records,
            wkt,
        })
    }

    /// Number of features in the dataset.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn read_file(path: &Path) -> ShpResult<Vec<u8>> {
    fs::read(path).map_err(|source| ShpError::Io {
        path: path.to_path_buf(),
        source,
    })
}
