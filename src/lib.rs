//! Prometheus exporter for PP traffic stats
//!
//! Polls the upstream introspection endpoint and republishes its lifetime byte
//! counters as monotonically increasing counters.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod stats;

pub use crate::config::{Args, ExporterConfig};
pub use crate::metrics::{MetricSink, PrometheusSink};
pub use crate::stats::{HttpSnapshotSource, Poller, Snapshot};
