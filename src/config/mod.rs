//! Exporter configuration
//!
//! Command-line flags (with environment fallbacks) validated into a typed config.

pub mod args;
pub mod error;
pub mod types;

pub use args::Args;
pub use error::{ConfigError, ConfigResult};
pub use types::ExporterConfig;
