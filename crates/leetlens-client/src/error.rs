//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No session credential could be obtained or was supplied.
    #[error("Authentication unavailable: {0}")]
    AuthUnavailable(String),

    /// Network failure or timeout.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status.
    #[error("Remote returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Parsed error body, or the raw text when it was not JSON.
        body: serde_json::Value,
    },

    /// Success status but no usable JSON payload.
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// A configuration or input value was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is a transport-level failure (network or HTTP status).
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Status { .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::AuthUnavailable(_))
            || matches!(self, Error::Status { status: 401 | 403, .. })
    }

    /// Check if the remote rate limit was hit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Status { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Status { status, .. } if *status >= 500)
    }

    /// Check if this is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(e) if e.is_timeout())
    }
}

impl From<leetlens_cache::Error> for Error {
    fn from(e: leetlens_cache::Error) -> Self {
        match e {
            leetlens_cache::Error::InvalidArgument(msg) => Error::InvalidArgument(msg),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
