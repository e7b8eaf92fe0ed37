use clap::Parser;

/// Command-line arguments for the exporter
#[derive(Parser, Debug, Clone)]
#[command(name = "pp-exporter", version, about = "Prometheus exporter for PP traffic stats")]
pub struct Args {
    /// PP status endpoint (normally: http://host/debug/vars)
    #[arg(short, long, env = "PP_EXPORTER_URL")]
    pub url: Option<String>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "PP_EXPORTER_PORT", default_value_t = Args::DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "PP_EXPORTER_HOST", default_value = Args::DEFAULT_HOST)]
    pub host: String,

    /// Metrics endpoint to listen on
    #[arg(short, long, env = "PP_EXPORTER_ENDPOINT", default_value = Args::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Interval in seconds to update statistics from PP
    #[arg(short, long, env = "PP_EXPORTER_INTERVAL", default_value_t = Args::DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Upstream request timeout in seconds
    #[arg(short, long, env = "PP_EXPORTER_TIMEOUT", default_value_t = Args::DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl Args {
    pub const DEFAULT_PORT: u16 = 2112;
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
    pub const DEFAULT_ENDPOINT: &'static str = "/metrics";
    pub const DEFAULT_INTERVAL_SECS: u64 = 15;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
}
