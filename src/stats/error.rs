use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Upstream returned status {0}")]
    BadStatus(u16),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

pub type FetchResult<T> = Result<T, FetchError>;
