//! GeoJSON feature and feature collection documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::Geometry;

/// Per-feature attribute record.
///
/// Keys keep their insertion order (`serde_json` is built with
/// `preserve_order`), which makes serialized output reproducible for a given
/// input file and field policy.
pub type Properties = Map<String, Value>;

/// A single GeoJSON feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    /// Record index within the source dataset, serialized as a string to
    /// match common GeoJSON writer output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `None` serializes as `null` (shapefile null shapes are legal).
    pub geometry: Option<Geometry>,
    pub properties: Properties,
}

impl Feature {
    pub fn new(id: usize, geometry: Option<Geometry>, properties: Properties) -> Self {
        Self {
            kind: "Feature".to_string(),
            id: Some(id.to_string()),
            geometry,
            properties,
        }
    }
}

/// A GeoJSON feature collection, the unit cached and served per layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }
}
