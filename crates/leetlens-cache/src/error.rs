//! Error types for cache operations.

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration call was rejected before taking effect.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, Error>;
