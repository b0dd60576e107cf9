//! GeoJSON geometry objects.
//!
//! The serde representation follows RFC 7946: a `type` tag plus a
//! `coordinates` array whose nesting depth depends on the geometry type.

use serde::{Deserialize, Serialize};

/// A single coordinate pair: `[x, y]` (longitude, latitude once reprojected).
pub type Position = [f64; 2];

/// A closed ring of positions (first and last positions equal).
pub type Ring = Vec<Position>;

/// GeoJSON geometry variants produced by the shapefile reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    /// Apply a coordinate transform to every position in place.
    ///
    /// The closure receives `(x, y)` in the source CRS and returns the
    /// transformed pair. Used by the pipeline to reproject geometries to
    /// WGS84.
    pub fn map_positions<F>(&mut self, f: &mut F)
    where
        F: FnMut(f64, f64) -> (f64, f64),
    {
        fn apply<F: FnMut(f64, f64) -> (f64, f64)>(pos: &mut Position, f: &mut F) {
            let (x, y) = f(pos[0], pos[1]);
            pos[0] = x;
            pos[1] = y;
        }

        match self {
            Geometry::Point(p) => apply(p, f),
            Geometry::MultiPoint(points) | Geometry::LineString(points) => {
                for p in points {
                    apply(p, f);
                }
            }
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                for line in lines {
                    for p in line {
                        apply(p, f);
                    }
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for rings in polygons {
                    for ring in rings {
                        for p in ring {
                            apply(p, f);
                        }
                    }
                }
            }
        }
    }

    /// Total number of positions across all parts.
    pub fn position_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::MultiPoint(points) | Geometry::LineString(points) => points.len(),
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().map(Vec::len).sum()
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .flat_map(|rings| rings.iter())
                .map(Vec::len)
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serializes_as_geojson() {
        let geom = Geometry::Point([-83.0, 40.0]);
        let json = serde_json::to_string(&geom).unwrap();
        assert_eq!(json, r#"{"type":"Point","coordinates":[-83.0,40.0]}"#);
    }

    #[test]
    fn test_polygon_serializes_with_ring_nesting() {
        let ring = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        let geom = Geometry::Polygon(vec![ring]);
        let json = serde_json::to_string(&geom).unwrap();
        assert!(json.starts_with(r#"{"type":"Polygon","coordinates":[[["#));
    }

    #[test]
    fn test_map_positions_visits_every_coordinate() {
        let mut geom = Geometry::MultiLineString(vec![
            vec![[1.0, 2.0], [3.0, 4.0]],
            vec![[5.0, 6.0]],
        ]);
        let mut seen = 0;
        geom.map_positions(&mut |x, y| {
            seen += 1;
            (x * 2.0, y * 2.0)
        });
        assert_eq!(seen, 3);
        assert_eq!(
            geom,
            Geometry::MultiLineString(vec![
                vec![[2.0, 4.0], [6.0, 8.0]],
                vec![[10.0, 12.0]],
            ])
        );
    }

    #[test]
    fn test_position_count() {
        let geom = Geometry::MultiPolygon(vec![vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
            vec![[0.2, 0.2], [0.4, 0.2], [0.4, 0.4], [0.2, 0.2]],
        ]]);
        assert_eq!(geom.position_count(), 8);
    }
}
