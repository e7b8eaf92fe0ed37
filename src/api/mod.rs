//! HTTP surface: scrape endpoint and root acknowledgement

use crate::metrics::render_metrics;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

/// Body returned from `/` and any unrouted path
pub const ROOT_MESSAGE: &str = "Hello to PP exporter";

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Build the exporter router
///
/// `metrics_path` serves the rendered counters; everything else answers with
/// the static acknowledgement.
pub fn create_router(handle: PrometheusHandle, metrics_path: &str) -> Router {
    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/", get(root_handler))
        .fallback(root_handler)
        .with_state(handle)
        .layer(TraceLayer::new_for_http())
}

async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        render_metrics(&handle),
    )
}

async fn root_handler() -> &'static str {
    ROOT_MESSAGE
}
