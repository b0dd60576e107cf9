//! Field mapping configuration loader.
//!
//! Loads per-layer attribute policies from a YAML file. A policy names the
//! original dbf fields worth serving, the display names to publish them
//! under, and optionally the field whose value becomes the synthetic
//! `Title` attribute the viewer uses for popups:
//!
//! ```yaml
//! layers:
//!   Ohio_County_Boundaries:
//!     title_field: name
//!     fields:
//!       name: County Name
//!       county_sea: County Seat
//! ```
//!
//! Layers without a policy serve every original attribute unmodified; the
//! pipeline logs a warning for them so gaps in the configuration are
//! visible to operators.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

/// Attribute policy for a single layer.
#[derive(Debug, Clone, Default)]
pub struct FieldPolicy {
    /// Field whose value is copied into the synthetic `Title` attribute.
    pub title_field: Option<String>,
    /// Original-name to display-name pairs, in configuration order. That
    /// order is also the serialized property order.
    pub fields: Vec<(String, String)>,
}

/// Registry of field policies keyed by layer name. Built once at startup
/// and passed into the pipeline explicitly; immutable afterward.
#[derive(Debug, Clone, Default)]
pub struct FieldMappingRegistry {
    policies: HashMap<String, FieldPolicy>,
}

// ============================================================================
// YAML Parsing Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct YamlConfigFile {
    #[serde(default)]
    layers: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
struct YamlPolicy {
    #[serde(default)]
    title_field: Option<String>,
    // A YAML mapping rather than a HashMap so configuration order survives.
    #[serde(default)]
    fields: serde_yaml::Mapping,
}

impl FieldMappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the registry from a YAML file. A missing or malformed file is
    /// not fatal: the registry comes back empty and every layer passes its
    /// attributes through unmodified.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Field mapping config not readable, serving unmapped attributes"
                );
                return Self::new();
            }
        };
        let registry = Self::load_from_str(&contents);
        info!(
            path = %path.display(),
            layers = registry.len(),
            "Field mapping registry loaded"
        );
        registry
    }

    /// Parse registry contents from a YAML string.
    pub fn load_from_str(contents: &str) -> Self {
        let yaml: YamlConfigFile = match serde_yaml::from_str(contents) {
            Ok(yaml) => yaml,
            Err(e) => {
                warn!(error = %e, "Failed to parse field mapping config");
                return Self::new();
            }
        };

        let mut registry = Self::new();
        for (key, value) in yaml.layers {
            let Some(layer) = key.as_str() else {
                warn!("Ignoring non-string layer key in field mapping config");
                continue;
            };
            match serde_yaml::from_value::<YamlPolicy>(value) {
                Ok(policy) => {
                    registry.insert(layer.to_string(), convert_policy(policy));
                }
                Err(e) => {
                    warn!(layer = %layer, error = %e, "Ignoring malformed field policy");
                }
            }
        }
        registry
    }

    pub fn insert(&mut self, layer: impl Into<String>, policy: FieldPolicy) {
        self.policies.insert(layer.into(), policy);
    }

    /// Pure lookup; `None` means the layer serves unmapped attributes.
    pub fn lookup(&self, layer: &str) -> Option<&FieldPolicy> {
        self.policies.get(layer)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

fn convert_policy(yaml: YamlPolicy) -> FieldPolicy {
    let mut fields = Vec::with_capacity(yaml.fields.len());
    for (key, value) in yaml.fields {
        match (key.as_str(), value.as_str()) {
            (Some(original), Some(display)) => {
                fields.push((original.to_string(), display.to_string()));
            }
            _ => warn!("Ignoring non-string field mapping entry"),
        }
    }
    FieldPolicy {
        title_field: yaml.title_field,
        fields,
    }
}
