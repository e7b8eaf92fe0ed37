use crate::config::args::Args;
use crate::config::error::{ConfigError, ConfigResult};
use reqwest::Url;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Validated exporter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Upstream introspection endpoint
    pub url: Url,

    /// Address the scrape server binds
    pub listen_addr: SocketAddr,

    /// Path serving the scrape output
    pub endpoint: String,

    /// Pause between poll cycles
    pub interval: Duration,

    /// Bound on a single upstream request
    pub timeout: Duration,
}

impl ExporterConfig {
    /// Validate parsed arguments
    ///
    /// Fails when the upstream URL is absent, so the process can exit before
    /// anything starts.
    pub fn from_args(args: Args) -> ConfigResult<Self> {
        let raw_url = args
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)?;

        let url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: raw_url,
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let host: IpAddr = args
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(args.host.clone()))?;

        validate_endpoint(&args.endpoint)?;

        if args.interval == 0 {
            return Err(ConfigError::ZeroDuration("interval"));
        }
        if args.timeout == 0 {
            return Err(ConfigError::ZeroDuration("timeout"));
        }

        Ok(Self {
            url,
            listen_addr: SocketAddr::new(host, args.port),
            endpoint: args.endpoint,
            interval: Duration::from_secs(args.interval),
            timeout: Duration::from_secs(args.timeout),
        })
    }
}

fn validate_endpoint(endpoint: &str) -> ConfigResult<()> {
    if !endpoint.starts_with('/') {
        return Err(ConfigError::InvalidEndpoint(format!(
            "'{endpoint}' must start with '/'"
        )));
    }
    // The root path is reserved for the acknowledgement handler
    if endpoint == "/" {
        return Err(ConfigError::InvalidEndpoint(
            "'/' is reserved for the root handler".to_string(),
        ));
    }
    // Route captures and wildcards would turn the path into a pattern
    if endpoint.contains([':', '*']) {
        return Err(ConfigError::InvalidEndpoint(format!(
            "'{endpoint}' must be a literal path without ':' or '*'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(url: Option<&str>) -> Args {
        Args {
            url: url.map(str::to_string),
            port: Args::DEFAULT_PORT,
            host: Args::DEFAULT_HOST.to_string(),
            endpoint: Args::DEFAULT_ENDPOINT.to_string(),
            interval: Args::DEFAULT_INTERVAL_SECS,
            timeout: Args::DEFAULT_TIMEOUT_SECS,
        }
    }

    #[test]
    fn test_valid_defaults() {
        let config = ExporterConfig::from_args(args(Some("http://127.0.0.1:10085/debug/vars")))
            .unwrap();

        assert_eq!(config.url.as_str(), "http://127.0.0.1:10085/debug/vars");
        assert_eq!(config.listen_addr, "0.0.0.0:2112".parse().unwrap());
        assert_eq!(config.endpoint, "/metrics");
        assert_eq!(config.interval, Duration::from_secs(15));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_url_is_fatal() {
        assert_eq!(ExporterConfig::from_args(args(None)), Err(ConfigError::MissingUrl));
        assert_eq!(
            ExporterConfig::from_args(args(Some("   "))),
            Err(ConfigError::MissingUrl)
        );
    }

    #[test]
    fn test_invalid_url() {
        let result = ExporterConfig::from_args(args(Some("localhost:10085")));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));

        let result = ExporterConfig::from_args(args(Some("ftp://host/debug/vars")));
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut bad = args(Some("http://host/debug/vars"));
        bad.endpoint = "metrics".to_string();
        assert!(matches!(
            ExporterConfig::from_args(bad),
            Err(ConfigError::InvalidEndpoint(_))
        ));

        let mut root = args(Some("http://host/debug/vars"));
        root.endpoint = "/".to_string();
        assert!(matches!(
            ExporterConfig::from_args(root),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_pattern_endpoint_rejected() {
        for endpoint in ["/*", "/*rest", "/:x", "/metrics/:id"] {
            let mut pattern = args(Some("http://host/debug/vars"));
            pattern.endpoint = endpoint.to_string();
            assert!(
                matches!(
                    ExporterConfig::from_args(pattern),
                    Err(ConfigError::InvalidEndpoint(_))
                ),
                "{endpoint}"
            );
        }

        let mut nested = args(Some("http://host/debug/vars"));
        nested.endpoint = "/exporter/metrics".to_string();
        assert!(ExporterConfig::from_args(nested).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut zero = args(Some("http://host/debug/vars"));
        zero.interval = 0;
        assert_eq!(
            ExporterConfig::from_args(zero),
            Err(ConfigError::ZeroDuration("interval"))
        );
    }

    #[test]
    fn test_invalid_host() {
        let mut bad = args(Some("http://host/debug/vars"));
        bad.host = "not-an-ip".to_string();
        assert!(matches!(
            ExporterConfig::from_args(bad),
            Err(ConfigError::InvalidHost(_))
        ));
    }
}
