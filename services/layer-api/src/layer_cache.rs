//! Layer payload caching.
//!
//! Caches the serialized GeoJSON per layer for the lifetime of the process.
//! Entries are created lazily on first request and never evicted or
//! invalidated: the datasets this service fronts are static reference data,
//! so on-disk changes after first load are deliberately not reflected.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use geo_common::GeoResult;
use metrics::counter;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Cache of serialized layer payloads with per-layer duplicate-load
/// suppression.
#[derive(Default)]
pub struct LayerCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Bytes>>>>,
}

impl LayerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached payload for `layer`, invoking `load` to produce it
    /// on first access.
    ///
    /// The map lock covers only the entry lookup; the load itself runs
    /// outside it, so loads for different layers proceed independently
    /// while simultaneous first requests for the same layer share a single
    /// load and receive the same bytes. A failed load leaves no entry
    /// behind and the next request retries from scratch.
    pub async fn get_or_load<F, Fut>(&self, layer: &str, load: F) -> GeoResult<Bytes>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GeoResult<String>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(layer.to_string()).or_default().clone()
        };

        if let Some(payload) = cell.get() {
            counter!("layer_cache_hits_total").increment(1);
            debug!(layer = %layer, "Layer cache hit");
            return Ok(payload.clone());
        }

        counter!("layer_cache_misses_total").increment(1);
        let payload = cell
            .get_or_try_init(|| async { load().await.map(Bytes::from) })
            .await?;
        Ok(payload.clone())
    }

    /// Number of layers with a cache slot (loaded or in flight).
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::GeoError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_loader(
        counter: Arc<AtomicUsize>,
        payload: &'static str,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = GeoResult<String>> + Send>> {
        move || {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(payload.to_string())
            })
        }
    }

    #[tokio::test]
    async fn test_second_call_is_a_hit() {
        let cache = LayerCache::new();
        let loads = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_or_load("counties", counting_loader(loads.clone(), "{}"))
            .await
            .unwrap();
        let second = cache
            .get_or_load("counties", counting_loader(loads.clone(), "{}"))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_loads_once() {
        let cache = Arc::new(LayerCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let loads = loads.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load("districts", move || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok(r#"{"type":"FeatureCollection","features":[]}"#.to_string())
                    })
                    .await
            }));
        }

        let payloads: Vec<Bytes> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(payloads.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache = LayerCache::new();
        let loads = Arc::new(AtomicUsize::new(0));

        let loads_first = loads.clone();
        let result = cache
            .get_or_load("flaky", move || async move {
                loads_first.fetch_add(1, Ordering::SeqCst);
                Err(GeoError::DataReadError("disk on fire".to_string()))
            })
            .await;
        assert!(result.is_err());

        let payload = cache
            .get_or_load("flaky", counting_loader(loads.clone(), "{}"))
            .await
            .unwrap();
        assert_eq!(payload, Bytes::from_static(b"{}"));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_layers_have_distinct_entries() {
        let cache = LayerCache::new();
        let loads = Arc::new(AtomicUsize::new(0));

        cache
            .get_or_load("a", counting_loader(loads.clone(), r#"{"layer":"a"}"#))
            .await
            .unwrap();
        let b = cache
            .get_or_load("b", counting_loader(loads.clone(), r#"{"layer":"b"}"#))
            .await
            .unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(b, Bytes::from_static(br#"{"layer":"b"}"#));
        assert_eq!(cache.len().await, 2);
    }
}
