//! Service boundary tests: allow-list enforcement and cache behavior as
//! seen through `AppState`.

use std::path::Path;

use layer_api::state::AppState;

use geo_common::GeoError;
use test_utils::{dbf, point_shp, write_layer, write_simple_point_layer, WGS84_WKT};

fn write_counties(dir: &Path) {
    let shp = point_shp(&[(-83.0, 39.96)]);
    let table = dbf(&[("name", 'C', 16)], &[vec!["Franklin"]]);
    write_layer(dir, "counties", &shp, &table, Some(WGS84_WKT));
}

fn state_for(dir: &Path) -> AppState {
    AppState::new(dir.to_path_buf(), Path::new("/nonexistent/mappings.yaml"))
}

#[tokio::test]
async fn test_discovered_layers_are_sorted() {
    let dir = test_utils::temp_data_dir();
    for name in ["zoning", "counties", "parcels"] {
        write_simple_point_layer(dir.path(), name, 0.0, 0.0, Some(WGS84_WKT));
    }

    let state = state_for(dir.path());
    assert_eq!(state.layers, ["counties", "parcels", "zoning"]);
}

#[tokio::test]
async fn test_unknown_layer_is_not_found() {
    let dir = test_utils::temp_data_dir();
    write_counties(dir.path());
    let state = state_for(dir.path());

    match state.fetch_layer("districts").await {
        Err(GeoError::LayerNotFound(name)) => assert_eq!(name, "districts"),
        other => panic!("expected LayerNotFound, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_path_traversal_names_are_rejected_without_disk_access() {
    let dir = test_utils::temp_data_dir();
    write_counties(dir.path());
    // A sibling file outside the data directory that a naive path join
    // would happily read.
    let sneaky_dir = test_utils::temp_data_dir();
    write_counties(sneaky_dir.path());
    let traversal = format!("../{}/counties", sneaky_dir.path().file_name().unwrap().to_str().unwrap());

    let state = state_for(dir.path());
    for name in ["../secret", "..", "/etc/passwd", traversal.as_str(), "counties/../counties"] {
        // Anything outside the discovered set must fail with LayerNotFound;
        // a DataReadError here would mean the filesystem was touched.
        match state.fetch_layer(name).await {
            Err(GeoError::LayerNotFound(_)) => {}
            other => panic!("{:?} for traversal name {:?}", other, name),
        }
    }
}

#[tokio::test]
async fn test_repeat_fetch_returns_identical_payload() {
    let dir = test_utils::temp_data_dir();
    write_counties(dir.path());
    let state = state_for(dir.path());

    let first = state.fetch_layer("counties").await.unwrap();
    let second = state.fetch_layer("counties").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(state.cache.len().await, 1);
}

#[tokio::test]
async fn test_cached_payload_survives_file_deletion() {
    // The staleness contract: once loaded, a layer is served from memory
    // even if the backing files disappear.
    let dir = test_utils::temp_data_dir();
    write_counties(dir.path());
    let state = state_for(dir.path());

    let first = state.fetch_layer("counties").await.unwrap();
    for ext in ["shp", "dbf", "prj"] {
        std::fs::remove_file(dir.path().join(format!("counties.{ext}"))).unwrap();
    }
    let second = state.fetch_layer("counties").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_failed_load_is_retried_on_next_request() {
    let dir = test_utils::temp_data_dir();
    // Discovery sees the layer, but its geometry file is garbage.
    std::fs::write(dir.path().join("broken.shp"), b"not a shapefile").unwrap();
    let state = state_for(dir.path());
    assert_eq!(state.layers, ["broken"]);

    assert!(matches!(
        state.fetch_layer("broken").await,
        Err(GeoError::DataReadError(_))
    ));

    // Repair the dataset on disk; no failure entry should block the retry.
    let shp = point_shp(&[(-83.0, 40.0)]);
    let table = dbf(&[("name", 'C', 8)], &[vec!["fixed"]]);
    write_layer(dir.path(), "broken", &shp, &table, Some(WGS84_WKT));

    let payload = state.fetch_layer("broken").await.unwrap();
    assert!(payload.starts_with(br#"{"type":"FeatureCollection""#));
}

#[tokio::test]
async fn test_payload_is_valid_geojson() {
    let dir = test_utils::temp_data_dir();
    write_counties(dir.path());
    let state = state_for(dir.path());

    let payload = state.fetch_layer("counties").await.unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(doc["type"], "FeatureCollection");
    assert_eq!(doc["features"][0]["type"], "Feature");
    assert_eq!(doc["features"][0]["properties"]["name"], "Franklin");
    let coords = doc["features"][0]["geometry"]["coordinates"]
        .as_array()
        .unwrap();
    assert_eq!(coords[0].as_f64().unwrap(), -83.0);
}

#[tokio::test]
async fn test_empty_data_directory_serves_empty_layer_list() {
    let dir = test_utils::temp_data_dir();
    let state = state_for(dir.path());
    assert!(state.layers.is_empty());
    assert!(matches!(
        state.fetch_layer("anything").await,
        Err(GeoError::LayerNotFound(_))
    ));
}
