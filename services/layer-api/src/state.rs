//! Application state and shared resources.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use geo_common::{GeoError, GeoResult};
use tracing::info;

use crate::discovery::discover_layers;
use crate::field_config::FieldMappingRegistry;
use crate::layer_cache::LayerCache;
use crate::pipeline;

/// Shared application state.
///
/// The layer list and field mapping registry are computed once here and are
/// immutable for the life of the process; the cache is the only shared
/// mutable structure.
pub struct AppState {
    pub data_dir: PathBuf,
    /// Sorted allow-list of discovered layer names.
    pub layers: Vec<String>,
    pub registry: FieldMappingRegistry,
    pub cache: LayerCache,
}

impl AppState {
    pub fn new(data_dir: PathBuf, field_config: &Path) -> Self {
        let layers = discover_layers(&data_dir);
        let registry = FieldMappingRegistry::load_from_file(field_config);
        info!(
            data_dir = %data_dir.display(),
            layers = layers.len(),
            mapped_layers = registry.len(),
            "Application state initialized"
        );
        Self {
            data_dir,
            layers,
            registry,
            cache: LayerCache::new(),
        }
    }

    /// Membership test against the discovery allow-list.
    pub fn is_known_layer(&self, name: &str) -> bool {
        self.layers.binary_search_by(|l| l.as_str().cmp(name)).is_ok()
    }

    /// Resolve a layer to its serialized GeoJSON payload, loading and
    /// caching it on first access.
    ///
    /// Names outside the allow-list fail with `LayerNotFound` before any
    /// filesystem access, which is what makes client-supplied names safe to
    /// accept here.
    pub async fn fetch_layer(&self, name: &str) -> GeoResult<Bytes> {
        if !self.is_known_layer(name) {
            return Err(GeoError::LayerNotFound(name.to_string()));
        }
        self.cache
            .get_or_load(name, || {
                pipeline::load_layer(
                    self.data_dir.clone(),
                    name.to_string(),
                    self.registry.clone(),
                )
            })
            .await
    }
}
