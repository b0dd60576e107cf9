//! `.dbf` (dBASE) attribute table parsing.
//!
//! Attribute values decode to JSON values: character fields as UTF-8 strings
//! (strict decoding, a hard error on invalid bytes), numeric fields as
//! integers or floats, logical fields as booleans, date fields as
//! `YYYY-MM-DD` strings. Field types outside that set decode to null.

use geo_common::feature::Properties;
use serde_json::{Number, Value};
use tracing::warn;

use crate::error::{ShpError, ShpResult};

/// Offset of the first field descriptor in the header.
const FIELD_DESCRIPTORS_START: usize = 32;

/// Size of one field descriptor.
const FIELD_DESCRIPTOR_LEN: usize = 32;

/// Terminator byte after the last field descriptor.
const HEADER_TERMINATOR: u8 = 0x0D;

/// One column of the attribute table.
#[derive(Debug, Clone)]
pub struct DbfField {
    pub name: String,
    pub kind: char,
    pub length: usize,
}

/// A parsed attribute table: column metadata plus one property record per
/// row, in file order.
#[derive(Debug, Clone)]
pub struct DbfTable {
    pub fields: Vec<DbfField>,
    pub records: Vec<Properties>,
}

/// Parse the full contents of a `.dbf` file.
pub fn read_table(data: &[u8]) -> ShpResult<DbfTable> {
    if data.len() < FIELD_DESCRIPTORS_START {
        return Err(ShpError::InvalidDbf("truncated header".to_string()));
    }

    let record_count = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
    let header_size = u16::from_le_bytes([data[8], data[9]]) as usize;
    let record_size = u16::from_le_bytes([data[10], data[11]]) as usize;

    let fields = read_field_descriptors(data)?;

    // Row layout: one deletion-flag byte followed by the fixed-width fields.
    let expected_size = 1 + fields.iter().map(|f| f.length).sum::<usize>();
    if record_size < expected_size {
        return Err(ShpError::InvalidDbf(format!(
            "record size {} smaller than field layout {}",
            record_size, expected_size
        )));
    }

    let mut records = Vec::with_capacity(record_count.min(data.len()));
    let mut pos = header_size;
    for row in 0..record_count {
        if pos + record_size > data.len() {
            return Err(ShpError::InvalidDbf(format!(
                "truncated at record {} of {}",
                row, record_count
            )));
        }
        // The deletion flag is deliberately ignored: rows must stay index-
        // aligned with the geometry file even if a row was soft-deleted.
        let row_bytes = &data[pos..pos + record_size];
        let mut offset = 1;
        let mut props = Properties::new();
        for field in &fields {
            let raw = &row_bytes[offset..offset + field.length];
            props.insert(field.name.clone(), decode_value(field, raw)?);
            offset += field.length;
        }
        records.push(props);
        pos += record_size;
    }

    Ok(DbfTable { fields, records })
}

fn read_field_descriptors(data: &[u8]) -> ShpResult<Vec<DbfField>> {
    let mut fields = Vec::new();
    let mut offset = FIELD_DESCRIPTORS_START;
    loop {
        if offset >= data.len() {
            return Err(ShpError::InvalidDbf(
                "missing field descriptor terminator".to_string(),
            ));
        }
        if data[offset] == HEADER_TERMINATOR {
            break;
        }
        if offset + FIELD_DESCRIPTOR_LEN > data.len() {
            return Err(ShpError::InvalidDbf(
                "truncated field descriptor".to_string(),
            ));
        }
        let descriptor = &data[offset..offset + FIELD_DESCRIPTOR_LEN];
        let name_len = descriptor[..11]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(11);
        let name = std::str::from_utf8(&descriptor[..name_len])
            .map_err(|_| ShpError::InvalidDbf("field name is not valid UTF-8".to_string()))?
            .trim()
            .to_string();
        let kind = descriptor[11] as char;
        let length = descriptor[16] as usize;
        fields.push(DbfField { name, kind, length });
        offset += FIELD_DESCRIPTOR_LEN;
    }
    Ok(fields)
}

/// Decode one fixed-width value.
fn decode_value(field: &DbfField, raw: &[u8]) -> ShpResult<Value> {
    match field.kind {
        'C' => {
            let text = std::str::from_utf8(raw).map_err(|_| {
                ShpError::InvalidDbf(format!("field '{}' is not valid UTF-8", field.name))
            })?;
            Ok(Value::String(
                text.trim_matches(|c| c == ' ' || c == '\0').to_string(),
            ))
        }
        'N' | 'F' => Ok(decode_number(raw)),
        'L' => Ok(match raw.iter().copied().find(|&b| b != b' ') {
            Some(b'T') | Some(b't') | Some(b'Y') | Some(b'y') => Value::Bool(true),
            Some(b'F') | Some(b'f') | Some(b'N') | Some(b'n') => Value::Bool(false),
            _ => Value::Null,
        }),
        'D' => Ok(decode_date(raw)),
        other => {
            warn!(field = %field.name, kind = %other, "Unsupported dbf field type, emitting null");
            Ok(Value::Null)
        }
    }
}

/// Numeric fields are ASCII, space-padded, `*`-filled when null. Values with
/// a decimal point or exponent decode as floats, others as integers;
/// unparseable content decodes to null rather than failing the dataset.
fn decode_number(raw: &[u8]) -> Value {
    let text: String = raw
        .iter()
        .map(|&b| b as char)
        .filter(|c| !c.is_whitespace() && *c != '\0')
        .collect();
    if text.is_empty() || text.contains('*') {
        return Value::Null;
    }
    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => Value::Null,
        }
    } else {
        match text.parse::<i64>() {
            Ok(n) => Value::Number(Number::from(n)),
            Err(_) => Value::Null,
        }
    }
}

/// Date fields are eight ASCII digits, `YYYYMMDD`.
fn decode_date(raw: &[u8]) -> Value {
    if raw.len() == 8 && raw.iter().all(|b| b.is_ascii_digit()) {
        let text = String::from_utf8_lossy(raw);
        Value::String(format!("{}-{}-{}", &text[..4], &text[4..6], &text[6..8]))
    } else {
        Value::Null
    }
}
