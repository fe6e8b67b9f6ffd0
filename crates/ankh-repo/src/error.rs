//! Error types for chart retrieval

use thiserror::Error;

/// Chart retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid registry URL: {url} - {reason}")]
    InvalidRegistryUrl { url: String, reason: String },

    #[error("Chart archive not found at {url}")]
    NotFound { url: String },

    #[error("Got status code {status} when trying to fetch {url}")]
    HttpError { status: u16, url: String },

    #[error("Network error fetching {url}: {message}")]
    NetworkError { url: String, message: String },

    #[error("Request timeout fetching {url}")]
    Timeout { url: String },

    #[error("Failed to build HTTP client: {message}")]
    Client { message: String },
}

impl FetchError {
    /// Classify a transport error for the given URL
    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = e.status() {
            FetchError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else if e.is_connect() {
            FetchError::NetworkError {
                url: url.to_string(),
                message: format!("Connection failed: {}", e),
            }
        } else {
            FetchError::NetworkError {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Result type for chart retrieval
pub type Result<T> = std::result::Result<T, FetchError>;
