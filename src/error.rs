//! Error taxonomy for network calls and discovery strategies

use thiserror::Error;

/// Failure of a single outbound HTTP call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Timeout")]
    Timeout,

    #[error("Connection Error: {0}")]
    Connect(String),

    /// 401/403 from the remote side
    #[error("Access forbidden")]
    Forbidden,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Short verdict text stored on a dead `LinkRecord`
    pub fn reason(&self) -> String {
        match self {
            FetchError::Timeout => "Timeout".to_string(),
            FetchError::Connect(_) => "Connection Error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connect(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => FetchError::Forbidden,
                code => FetchError::Status(code),
            }
        } else if err.is_builder() {
            FetchError::InvalidUrl(err.to_string())
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

/// Why a discovery strategy gave up
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The source refused access; the resolver moves on to the next strategy
    #[error("access forbidden")]
    Forbidden,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("could not parse response: {0}")]
    Parse(String),
}
