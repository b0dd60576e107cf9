//! Synthetic shapefile builders.
//!
//! Generates minimal but structurally valid `.shp` and `.dbf` byte streams
//! so parser and pipeline tests don't depend on binary fixture files.

use std::fs;
use std::path::Path;

/// Build a `.shp` file of Point records.
pub fn point_shp(points: &[(f64, f64)]) -> Vec<u8> {
    let mut records = Vec::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        records.extend_from_slice(&(i as i32 + 1).to_be_bytes());
        records.extend_from_slice(&10i32.to_be_bytes()); // 20 content bytes
        records.extend_from_slice(&1i32.to_le_bytes());
        records.extend_from_slice(&x.to_le_bytes());
        records.extend_from_slice(&y.to_le_bytes());
    }
    finish_shp(1, bbox_of(points), records)
}

/// Build a `.shp` file with a single Polygon record. Each entry in `rings`
/// is a closed ring; wind exteriors clockwise and holes counter-clockwise
/// as the format requires.
pub fn polygon_shp(rings: &[Vec<(f64, f64)>]) -> Vec<u8> {
    let num_points: usize = rings.iter().map(Vec::len).sum();
    let content_bytes = 4 + 32 + 4 + 4 + 4 * rings.len() + 16 * num_points;

    let mut records = Vec::new();
    records.extend_from_slice(&1i32.to_be_bytes());
    records.extend_from_slice(&((content_bytes / 2) as i32).to_be_bytes());
    records.extend_from_slice(&5i32.to_le_bytes());

    let all: Vec<(f64, f64)> = rings.iter().flatten().copied().collect();
    let bbox = bbox_of(&all);
    for v in bbox {
        records.extend_from_slice(&v.to_le_bytes());
    }

    records.extend_from_slice(&(rings.len() as i32).to_le_bytes());
    records.extend_from_slice(&(num_points as i32).to_le_bytes());
    let mut offset = 0i32;
    for ring in rings {
        records.extend_from_slice(&offset.to_le_bytes());
        offset += ring.len() as i32;
    }
    for &(x, y) in rings.iter().flatten() {
        records.extend_from_slice(&x.to_le_bytes());
        records.extend_from_slice(&y.to_le_bytes());
    }

    finish_shp(5, bbox, records)
}

/// Build a `.shp` file containing a single record of an arbitrary shape
/// type with empty content, for unsupported-type tests.
pub fn raw_type_shp(shape_type: i32) -> Vec<u8> {
    let mut records = Vec::new();
    records.extend_from_slice(&1i32.to_be_bytes());
    records.extend_from_slice(&2i32.to_be_bytes()); // 4 content bytes
    records.extend_from_slice(&shape_type.to_le_bytes());
    finish_shp(shape_type, [0.0; 4], records)
}

fn bbox_of(points: &[(f64, f64)]) -> [f64; 4] {
    let mut bbox = [f64::MAX, f64::MAX, f64::MIN, f64::MIN];
    for &(x, y) in points {
        bbox[0] = bbox[0].min(x);
        bbox[1] = bbox[1].min(y);
        bbox[2] = bbox[2].max(x);
        bbox[3] = bbox[3].max(y);
    }
    if points.is_empty() {
        bbox = [0.0; 4];
    }
    bbox
}

/// Prepend the 100-byte main header to a record block.
fn finish_shp(shape_type: i32, bbox: [f64; 4], records: Vec<u8>) -> Vec<u8> {
    let total = 100 + records.len();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&9994i32.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&((total / 2) as i32).to_be_bytes());
    out.extend_from_slice(&1000i32.to_le_bytes());
    out.extend_from_slice(&shape_type.to_le_bytes());
    for v in bbox {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out.extend_from_slice(&[0u8; 32]); // z/m ranges
    out.extend_from_slice(&records);
    out
}

/// Build a `.dbf` file. Fields are `(name, type, width)`; rows supply one
/// string per field, padded/truncated to the declared width.
pub fn dbf(fields: &[(&str, char, u8)], rows: &[Vec<&str>]) -> Vec<u8> {
    let record_size: usize = 1 + fields.iter().map(|f| f.2 as usize).sum::<usize>();
    let header_size = 32 + 32 * fields.len() + 1;

    let mut out = Vec::new();
    out.push(0x03); // dBASE III without memo
    out.extend_from_slice(&[95, 7, 26]); // last-update date, arbitrary
    out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    out.extend_from_slice(&(header_size as u16).to_le_bytes());
    out.extend_from_slice(&(record_size as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);

    for &(name, kind, width) in fields {
        let mut descriptor = [0u8; 32];
        let name_bytes = name.as_bytes();
        descriptor[..name_bytes.len().min(11)]
            .copy_from_slice(&name_bytes[..name_bytes.len().min(11)]);
        descriptor[11] = kind as u8;
        descriptor[16] = width;
        out.extend_from_slice(&descriptor);
    }
    out.push(0x0D);

    for row in rows {
        out.push(b' '); // active record
        for (value, &(_, kind, width)) in row.iter().zip(fields) {
            let width = width as usize;
            let bytes = value.as_bytes();
            let mut cell = vec![b' '; width];
            let len = bytes.len().min(width);
            if kind == 'N' || kind == 'F' {
                // Numerics are right-justified
                cell[width - len..].copy_from_slice(&bytes[..len]);
            } else {
                cell[..len].copy_from_slice(&bytes[..len]);
            }
            out.extend_from_slice(&cell);
        }
    }
    out.push(0x1A);
    out
}

/// Write a complete layer dataset (`.shp`, `.dbf`, optional `.prj`) into a
/// directory.
pub fn write_layer(dir: &Path, name: &str, shp: &[u8], dbf_bytes: &[u8], prj: Option<&str>) {
    fs::write(dir.join(format!("{name}.shp")), shp).expect("write .shp");
    fs::write(dir.join(format!("{name}.dbf")), dbf_bytes).expect("write .dbf");
    if let Some(wkt) = prj {
        fs::write(dir.join(format!("{name}.prj")), wkt).expect("write .prj");
    }
}

/// Write a one-field, one-record point layer, the smallest dataset most
/// pipeline tests need.
pub fn write_simple_point_layer(dir: &Path, name: &str, x: f64, y: f64, prj: Option<&str>) {
    let shp = point_shp(&[(x, y)]);
    let table = dbf(&[("name", 'C', 16)], &[vec!["sample"]]);
    write_layer(dir, name, &shp, &table, prj);
}
