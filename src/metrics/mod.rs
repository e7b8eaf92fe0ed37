//! Metrics and observability module
//!
//! Provides Prometheus-compatible counters for the bridged upstream stats.
//!
//! Key metrics exposed:
//! - Per-category traffic (`pp_inbound_*`, `pp_outbound_*`), downlink and uplink
//! - Per-user traffic (`pp_user_downlink`, `pp_user_uplink`) labelled by `email`

pub mod exporter;
pub mod sink;

pub use exporter::{init_metrics, install_recorder, render_metrics, MetricsError};
pub use sink::{user_metric_name, InMemorySink, MetricSink, PrometheusSink, USER_LABEL};
