//! Prometheus metrics exporter
//!
//! Installs the recorder that backs the exported counters and renders them for scraping.

use crate::metrics::sink::user_metric_name;
use crate::stats::{Category, Direction};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

/// Global prometheus handle
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Register descriptions for every exported series (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return; // Already initialized
    }

    for category in Category::ALL {
        for direction in Direction::ALL {
            describe_counter!(
                category.metric_name(direction),
                format!("Bytes transferred {direction} through {category}")
            );
        }
    }

    describe_counter!(
        user_metric_name(Direction::Downlink),
        "Bytes transferred downlink per user"
    );
    describe_counter!(
        user_metric_name(Direction::Uplink),
        "Bytes transferred uplink per user"
    );
}

/// Install the global Prometheus recorder
///
/// No HTTP listener is started; the scrape route renders through the handle.
/// Subsequent calls return the existing handle.
pub fn install_recorder() -> Result<PrometheusHandle, MetricsError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::SetupFailed(e.to_string()))?;

    // Describe after install so the descriptions reach this recorder
    init_metrics();

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Render current counter values in the Prometheus text format
pub fn render_metrics(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// Errors that can occur during metrics setup
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to setup metrics: {0}")]
    SetupFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::sink::{MetricSink, PrometheusSink};

    #[test]
    fn test_init_metrics() {
        // Should not panic when called multiple times
        init_metrics();
        init_metrics();
    }

    #[test]
    fn test_render_includes_descriptions() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            for direction in Direction::ALL {
                describe_counter!(
                    Category::OutboundDirect.metric_name(direction),
                    "Bytes through outbound.direct"
                );
            }
            PrometheusSink.increment_fixed(Category::OutboundDirect, Direction::Uplink, 2500);
        });

        let rendered = render_metrics(&handle);
        assert!(rendered.contains("# TYPE pp_outbound_direct_uplink counter"), "{rendered}");
        assert!(rendered.contains("pp_outbound_direct_uplink 2500"), "{rendered}");
    }
}
