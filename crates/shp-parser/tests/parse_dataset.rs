//! End-to-end dataset parsing tests over synthetic shapefiles.

use geo_common::geometry::Geometry;
use serde_json::Value;
use shp_parser::{ShpDataset, ShpError};
use test_utils::{dbf, point_shp, polygon_shp, raw_type_shp, write_layer, WGS84_WKT};

#[test]
fn test_point_dataset_round_trip() {
    let dir = test_utils::temp_data_dir();
    let shp = point_shp(&[(-83.0, 40.0), (-82.5, 39.5)]);
    let table = dbf(
        &[("name", 'C', 16), ("pop", 'N', 10)],
        &[vec!["Columbus", "905748"], vec!["Circleville", "13927"]],
    );
    write_layer(dir.path(), "cities", &shp, &table, Some(WGS84_WKT));

    let dataset = ShpDataset::open(dir.path().join("cities.shp")).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(
        dataset.shapes[0],
        Some(Geometry::Point([-83.0, 40.0]))
    );
    assert_eq!(
        dataset.records[0].get("name"),
        Some(&Value::String("Columbus".to_string()))
    );
    assert_eq!(dataset.records[1].get("pop"), Some(&Value::from(13927i64)));
    assert!(dataset.wkt.as_deref().unwrap().starts_with("GEOGCS"));
}

#[test]
fn test_polygon_with_hole() {
    let dir = test_utils::temp_data_dir();
    // Exterior clockwise, hole counter-clockwise.
    let exterior = vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)];
    let hole = vec![(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 4.0), (2.0, 2.0)];
    let shp = polygon_shp(&[exterior, hole]);
    let table = dbf(&[("name", 'C', 8)], &[vec!["donut"]]);
    write_layer(dir.path(), "areas", &shp, &table, None);

    let dataset = ShpDataset::open(dir.path().join("areas.shp")).unwrap();
    assert!(dataset.wkt.is_none());
    match &dataset.shapes[0] {
        Some(Geometry::Polygon(rings)) => {
            assert_eq!(rings.len(), 2);
            assert_eq!(rings[0].len(), 5);
        }
        other => panic!("expected polygon with hole, got {:?}", other),
    }
}

#[test]
fn test_missing_dbf_is_io_error() {
    let dir = test_utils::temp_data_dir();
    std::fs::write(dir.path().join("orphan.shp"), point_shp(&[(0.0, 0.0)])).unwrap();

    match ShpDataset::open(dir.path().join("orphan.shp")) {
        Err(ShpError::Io { path, .. }) => {
            assert!(path.to_string_lossy().ends_with("orphan.dbf"));
        }
        other => panic!("expected Io error, got {:?}", other.err()),
    }
}

#[test]
fn test_record_count_mismatch_is_rejected() {
    let dir = test_utils::temp_data_dir();
    let shp = point_shp(&[(0.0, 0.0), (1.0, 1.0)]);
    let table = dbf(&[("name", 'C', 8)], &[vec!["only-one"]]);
    write_layer(dir.path(), "skewed", &shp, &table, None);

    assert!(matches!(
        ShpDataset::open(dir.path().join("skewed.shp")),
        Err(ShpError::InvalidDbf(_))
    ));
}

#[test]
fn test_unsupported_shape_type() {
    let dir = test_utils::temp_data_dir();
    let table = dbf(&[("name", 'C', 8)], &[vec!["x"]]);
    write_layer(dir.path(), "weird", &raw_type_shp(31), &table, None);

    assert!(matches!(
        ShpDataset::open(dir.path().join("weird.shp")),
        Err(ShpError::UnsupportedShapeType(31))
    ));
}

#[test]
fn test_truncated_shp_is_rejected() {
    let dir = test_utils::temp_data_dir();
    let mut shp = point_shp(&[(0.0, 0.0)]);
    shp.truncate(shp.len() - 6);
    let table = dbf(&[("name", 'C', 8)], &[vec!["x"]]);
    write_layer(dir.path(), "cut", &shp, &table, None);

    assert!(matches!(
        ShpDataset::open(dir.path().join("cut.shp")),
        Err(ShpError::InvalidShp(_))
    ));
}

#[test]
fn test_attribute_order_follows_dbf_columns() {
    let dir = test_utils::temp_data_dir();
    let shp = point_shp(&[(1.0, 2.0)]);
    let table = dbf(
        &[("zfield", 'C', 4), ("afield", 'C', 4)],
        &[vec!["z", "a"]],
    );
    write_layer(dir.path(), "ordered", &shp, &table, None);

    let dataset = ShpDataset::open(dir.path().join("ordered.shp")).unwrap();
    let keys: Vec<&String> = dataset.records[0].keys().collect();
    assert_eq!(keys, ["zfield", "afield"]);
}
