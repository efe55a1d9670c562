//! REST adapter error types.

/// Errors raised while building the REST client.
#[derive(Debug, thiserror::Error)]
pub enum HttpAdapterError {
    /// The base URL is empty or not `http(s)`.
    #[error("invalid API base URL {0:?}")]
    InvalidBaseUrl(String),

    /// The timeout is zero.
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    /// reqwest could not build its client (TLS backend initialisation).
    #[error("failed to build HTTP client")]
    Build(#[from] reqwest::Error),
}
