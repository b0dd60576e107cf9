//! HTTP request handlers for the layer API.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::{debug, error, instrument};

use geo_common::GeoError;

use crate::state::AppState;

/// Embedded map viewer page.
const VIEWER_HTML: &str = include_str!("../static/index.html");

/// GET / - the map viewer page
pub async fn index_handler() -> Html<&'static str> {
    Html(VIEWER_HTML)
}

/// GET /api/layers - names of all discovered layers, sorted
#[instrument(skip(state))]
pub async fn layers_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.layers.clone())
}

/// GET /api/data/:layer_name - GeoJSON for one layer, loaded and cached on
/// first access
#[instrument(skip(state))]
pub async fn layer_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer_name): Path<String>,
) -> Response {
    counter!("layer_data_requests_total").increment(1);

    match state.fetch_layer(&layer_name).await {
        Ok(payload) => geojson_response(payload),
        Err(GeoError::LayerNotFound(_)) => {
            debug!(layer = %layer_name, "Requested layer is not in the discovered set");
            error_response(StatusCode::NOT_FOUND, "Layer not found".to_string())
        }
        Err(e) => {
            counter!("layer_load_errors_total").increment(1);
            error!(layer = %layer_name, error = %e, "Failed to load layer");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not load data for layer: {}", layer_name),
            )
        }
    }
}

/// GET /health - basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> String {
    handle.render()
}

fn geojson_response(payload: Bytes) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap()
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
