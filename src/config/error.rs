use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required argument --url, see '--help' for information")]
    MissingUrl,

    #[error("Invalid upstream URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid metrics endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid listen host: {0}")]
    InvalidHost(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
