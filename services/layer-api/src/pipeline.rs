//! Layer transform pipeline.
//!
//! Loads a shapefile dataset, reprojects its geometry to WGS84, applies the
//! layer's field policy, and serializes the result to a GeoJSON string. One
//! invocation per layer per process in the happy path; the cache in front
//! of this module absorbs everything else.

use std::path::{Path, PathBuf};

use geo_common::feature::{Feature, FeatureCollection, Properties};
use geo_common::{GeoError, GeoResult};
use projection::parse_wkt;
use shp_parser::ShpDataset;
use tracing::{info, warn};

use crate::field_config::{FieldMappingRegistry, FieldPolicy};

/// Load and transform one layer. Runs on the blocking pool: the work is
/// file reads plus per-coordinate math over potentially large geometry
/// sets.
///
/// Callers are responsible for validating `layer` against the discovery
/// allow-list; this function only resolves the expected path.
pub async fn load_layer(
    data_dir: PathBuf,
    layer: String,
    registry: FieldMappingRegistry,
) -> GeoResult<String> {
    tokio::task::spawn_blocking(move || load_layer_sync(&data_dir, &layer, &registry))
        .await
        .map_err(|e| GeoError::InternalError(format!("load task failed: {}", e)))?
}

fn load_layer_sync(
    data_dir: &Path,
    layer: &str,
    registry: &FieldMappingRegistry,
) -> GeoResult<String> {
    let path = data_dir.join(format!("{}.shp", layer));
    info!(layer = %layer, path = %path.display(), "Loading layer from disk");

    let dataset = ShpDataset::open(&path)
        .map_err(|e| GeoError::DataReadError(format!("{}: {}", path.display(), e)))?;

    let wkt = dataset.wkt.as_deref().ok_or_else(|| {
        GeoError::ProjectionError(format!("layer '{}' has no .prj companion", layer))
    })?;
    let source = parse_wkt(wkt)
        .map_err(|e| GeoError::ProjectionError(format!("layer '{}': {}", layer, e)))?;

    let policy = registry.lookup(layer);
    if policy.is_none() {
        warn!(layer = %layer, "No field mapping configured, serving all attributes");
    }

    let feature_count = dataset.len();
    let mut features = Vec::with_capacity(feature_count);
    for (index, (geometry, record)) in dataset
        .shapes
        .into_iter()
        .zip(dataset.records)
        .enumerate()
    {
        let mut geometry = geometry;
        if !source.is_geographic() {
            if let Some(g) = geometry.as_mut() {
                g.map_positions(&mut |x, y| source.to_lon_lat(x, y));
            }
        }
        let properties = match policy {
            Some(policy) => apply_policy(policy, &record),
            None => record,
        };
        features.push(Feature::new(index, geometry, properties));
    }

    info!(layer = %layer, features = feature_count, "Layer transformed");
    Ok(serde_json::to_string(&FeatureCollection::new(features))?)
}

/// Build the output attribute record for one feature: `Title` first when a
/// title field is designated and present, then each mapped field in policy
/// order. Fields missing from the source record are skipped; source fields
/// not named by the policy are dropped.
fn apply_policy(policy: &FieldPolicy, record: &Properties) -> Properties {
    let mut out = Properties::new();
    if let Some(title_field) = &policy.title_field {
        if let Some(value) = record.get(title_field) {
            out.insert("Title".to_string(), value.clone());
        }
    }
    for (original, display) in &policy.fields {
        if let Some(value) = record.get(original) {
            out.insert(display.clone(), value.clone());
        }
    }
    out
}
