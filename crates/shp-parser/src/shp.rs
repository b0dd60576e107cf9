//! `.shp` geometry file parsing.
//!
//! The main file is a 100-byte header followed by variable-length records.
//! Integers in the header and record headers are big-endian; record contents
//! are little-endian (ESRI Shapefile Technical Description, July 1998).

use bytes::Buf;
use geo_common::geometry::{Geometry, Position, Ring};

use crate::error::{ShpError, ShpResult};

/// Magic number at the start of every `.shp` and `.shx` file.
pub const FILE_CODE: i32 = 9994;

/// The only shapefile version ever published.
pub const VERSION: i32 = 1000;

/// Length of the main file header in bytes.
pub const MAIN_HEADER_LEN: usize = 100;

/// Parse the full contents of a `.shp` file into geometries, one entry per
/// record. Null shapes (type 0) produce `None`.
pub fn read_shapes(data: &[u8]) -> ShpResult<Vec<Option<Geometry>>> {
    let mut cur = Cursor::new(data);

    let file_code = cur.i32_be("file header")?;
    if file_code != FILE_CODE {
        return Err(ShpError::InvalidShp(format!(
            "bad file code {} (expected {})",
            file_code, FILE_CODE
        )));
    }
    cur.skip(20, "file header")?; // five unused i32 slots
    let file_len_words = cur.i32_be("file length")?;
    let version = cur.i32_le("version")?;
    if version != VERSION {
        return Err(ShpError::InvalidShp(format!(
            "unsupported shapefile version {}",
            version
        )));
    }
    let _shape_type = cur.i32_le("shape type")?;
    cur.skip(64, "bounding box")?; // x/y/z/m ranges

    let expected_bytes = file_len_words as usize * 2;
    if expected_bytes != data.len() {
        tracing::warn!(
            declared = expected_bytes,
            actual = data.len(),
            "Shapefile length field disagrees with file size"
        );
    }

    let mut shapes = Vec::new();
    while cur.remaining() >= 8 {
        let _record_number = cur.i32_be("record header")?;
        let content_words = cur.i32_be("record header")?;
        if content_words < 2 {
            return Err(ShpError::InvalidShp(format!(
                "record {} content too short",
                shapes.len()
            )));
        }
        let content = cur.take(content_words as usize * 2, "record content")?;
        shapes.push(read_shape(content)?);
    }

    Ok(shapes)
}

/// Parse one record's content. Z and M variants are read for their XY part;
/// the measure blocks that follow are ignored.
fn read_shape(content: &[u8]) -> ShpResult<Option<Geometry>> {
    let mut cur = Cursor::new(content);
    let shape_type = cur.i32_le("shape type")?;
    match shape_type {
        0 => Ok(None),
        1 | 11 | 21 => {
            let x = cur.f64_le("point x")?;
            let y = cur.f64_le("point y")?;
            Ok(Some(Geometry::Point([x, y])))
        }
        8 | 18 | 28 => read_multipoint(&mut cur).map(Some),
        3 | 13 | 23 => {
            let parts = read_parts(&mut cur)?;
            Ok(Some(if parts.len() == 1 {
                Geometry::LineString(parts.into_iter().next().unwrap_or_default())
            } else {
                Geometry::MultiLineString(parts)
            }))
        }
        5 | 15 | 25 => {
            let rings = read_parts(&mut cur)?;
            Ok(Some(assemble_polygons(rings)))
        }
        other => Err(ShpError::UnsupportedShapeType(other)),
    }
}

fn read_multipoint(cur: &mut Cursor) -> ShpResult<Geometry> {
    cur.skip(32, "multipoint bounding box")?;
    let count = cur.count("multipoint count")?;
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        points.push([cur.f64_le("multipoint x")?, cur.f64_le("multipoint y")?]);
    }
    Ok(Geometry::MultiPoint(points))
}

/// Read the shared PolyLine/Polygon layout: bounding box, part offsets, and
/// the flat point array split at the part boundaries.
fn read_parts(cur: &mut Cursor) -> ShpResult<Vec<Vec<Position>>> {
    cur.skip(32, "part bounding box")?;
    let num_parts = cur.count("part count")?;
    let num_points = cur.count("point count")?;

    let mut offsets = Vec::with_capacity(num_parts);
    for _ in 0..num_parts {
        let off = cur.count("part offset")?;
        if off > num_points {
            return Err(ShpError::InvalidShp(format!(
                "part offset {} exceeds point count {}",
                off, num_points
            )));
        }
        offsets.push(off);
    }

    let mut points = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        points.push([cur.f64_le("part x")?, cur.f64_le("part y")?]);
    }

    let mut parts = Vec::with_capacity(num_parts);
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(num_points);
        if end < start {
            return Err(ShpError::InvalidShp(
                "part offsets are not monotonically increasing".to_string(),
            ));
        }
        parts.push(points[start..end].to_vec());
    }

    Ok(parts)
}

// ============================================================================
// Polygon Ring Assembly
// ============================================================================

/// Group shapefile polygon rings into GeoJSON polygons.
///
/// Shapefile exteriors wind clockwise (negative shoelace area) and holes
/// counter-clockwise. Each hole is attached to the exterior that contains
/// its first vertex; a file with a single exterior yields `Polygon`, several
/// yield `MultiPolygon`.
pub(crate) fn assemble_polygons(rings: Vec<Ring>) -> Geometry {
    let mut polygons: Vec<Vec<Ring>> = Vec::new();
    let mut holes: Vec<Ring> = Vec::new();

    for ring in rings.into_iter().filter(|r| r.len() >= 3) {
        if signed_area(&ring) <= 0.0 {
            polygons.push(vec![ring]);
        } else {
            holes.push(ring);
        }
    }

    // A writer that wound everything counter-clockwise leaves no exteriors;
    // promote the rings so the data still renders.
    if polygons.is_empty() {
        polygons = holes.drain(..).map(|r| vec![r]).collect();
    }

    for hole in holes {
        let probe = hole[0];
        let target = polygons
            .iter()
            .position(|rings| point_in_ring(probe, &rings[0]))
            .unwrap_or(0);
        polygons[target].push(hole);
    }

    if polygons.len() == 1 {
        Geometry::Polygon(polygons.into_iter().next().unwrap_or_default())
    } else {
        Geometry::MultiPolygon(polygons)
    }
}

/// Shoelace signed area; positive for counter-clockwise winding.
fn signed_area(ring: &[Position]) -> f64 {
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let [x1, y1] = ring[i];
        let [x2, y2] = ring[(i + 1) % ring.len()];
        sum += x1 * y2 - x2 * y1;
    }
    sum / 2.0
}

/// Ray-casting point-in-polygon test against a single ring.
fn point_in_ring(point: Position, ring: &[Position]) -> bool {
    let [px, py] = point;
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ============================================================================
// Byte Cursor
// ============================================================================

/// Bounds-checked reader over a byte slice. Every accessor names what it was
/// reading so truncation errors are diagnosable.
struct Cursor<'a> {
    buf: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn remaining(&self) -> usize {
        self.buf.len()
    }

    fn need(&self, n: usize, what: &str) -> ShpResult<()> {
        if self.buf.len() < n {
            Err(ShpError::InvalidShp(format!("truncated {}", what)))
        } else {
            Ok(())
        }
    }

    fn i32_be(&mut self, what: &str) -> ShpResult<i32> {
        self.need(4, what)?;
        Ok(self.buf.get_i32())
    }

    fn i32_le(&mut self, what: &str) -> ShpResult<i32> {
        self.need(4, what)?;
        Ok(self.buf.get_i32_le())
    }

    fn f64_le(&mut self, what: &str) -> ShpResult<f64> {
        self.need(8, what)?;
        Ok(self.buf.get_f64_le())
    }

    /// Read a little-endian count and validate it fits in the remaining
    /// buffer, so corrupt counts fail before any large allocation.
    fn count(&mut self, what: &str) -> ShpResult<usize> {
        let n = self.i32_le(what)?;
        if n < 0 || n as usize > self.buf.len() {
            return Err(ShpError::InvalidShp(format!("implausible {}: {}", what, n)));
        }
        Ok(n as usize)
    }

    fn skip(&mut self, n: usize, what: &str) -> ShpResult<()> {
        self.need(n, what)?;
        self.buf.advance(n);
        Ok(())
    }

    fn take(&mut self, n: usize, what: &str) -> ShpResult<&'a [u8]> {
        self.need(n, what)?;
        let buf: &'a [u8] = self.buf;
        let (head, tail) = buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }
}
