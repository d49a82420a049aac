//! Error types for PageFetch

use std::time::Duration;
use thiserror::Error;

/// Broad failure category, stable across variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad URL, format, or timeout; no network activity happened
    InvalidInput,
    /// Final status outside 2xx
    RequestFailed,
    /// Declared or streamed size exceeded the cap
    ResponseTooLarge,
    /// Wall-clock timeout exceeded
    Timeout,
    /// Connection-level failure not otherwise classified
    NetworkError,
}

/// Errors that can occur during fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL is missing
    #[error("Missing required parameter: url")]
    MissingUrl,

    /// URL has invalid scheme
    #[error("Invalid URL: must start with http:// or https://")]
    InvalidUrlScheme,

    /// URL has a valid scheme but does not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Output format is not one of text, markdown, html
    #[error("Invalid format '{0}': must be text, markdown, or html")]
    InvalidFormat(String),

    /// Timeout is zero
    #[error("Invalid timeout: must be a positive number of seconds")]
    InvalidTimeout,

    /// Final response status outside 2xx
    #[error("Request failed with status code: {status}")]
    RequestFailed { status: u16 },

    /// Declared or streamed body size exceeded the cap
    #[error("Response too large (exceeds {}MB limit)", format_mb(.limit))]
    ResponseTooLarge { limit: u64 },

    /// Wall-clock timeout exceeded
    #[error("Request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other transport error
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl FetchError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                secs: timeout.as_secs(),
            }
        } else if err.is_connect() {
            FetchError::ConnectError(err)
        } else {
            FetchError::NetworkError(err.to_string())
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::MissingUrl
            | FetchError::InvalidUrlScheme
            | FetchError::InvalidUrl(_)
            | FetchError::InvalidFormat(_)
            | FetchError::InvalidTimeout => ErrorKind::InvalidInput,
            FetchError::RequestFailed { .. } => ErrorKind::RequestFailed,
            FetchError::ResponseTooLarge { .. } => ErrorKind::ResponseTooLarge,
            FetchError::Timeout { .. } => ErrorKind::Timeout,
            FetchError::ClientBuildError(_)
            | FetchError::ConnectError(_)
            | FetchError::NetworkError(_) => ErrorKind::NetworkError,
        }
    }
}

/// Render a byte limit in MB, without a fraction when it divides evenly
fn format_mb(limit: &u64) -> String {
    const MB: u64 = 1024 * 1024;
    if limit % MB == 0 {
        (limit / MB).to_string()
    } else {
        format!("{:.2}", *limit as f64 / MB as f64)
    }
}
