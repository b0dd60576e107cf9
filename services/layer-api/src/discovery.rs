//! Dataset discovery.
//!
//! Scans the data directory once at startup for shapefile datasets. The
//! resulting sorted name list is both the `/api/layers` response and the
//! allow-list every data request is validated against.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

/// Scan a directory for `.shp` files and return their sorted, deduplicated
/// base names.
///
/// Only top-level regular files are considered. A missing or unreadable
/// directory is not fatal: the service starts with an empty layer set.
pub fn discover_layers<P: AsRef<Path>>(directory: P) -> Vec<String> {
    let directory = directory.as_ref();

    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                path = %directory.display(),
                error = %e,
                "Data directory not readable, no layers available"
            );
            return Vec::new();
        }
    };

    let mut layers: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if !path.is_file() {
                return None;
            }
            if path.extension().and_then(|s| s.to_str()) != Some("shp") {
                return None;
            }
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(String::from)
        })
        .collect();

    layers.sort();
    layers.dedup();

    info!(count = layers.len(), "Discovered shapefile layers");
    layers
}
