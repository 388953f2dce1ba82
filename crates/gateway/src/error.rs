use thiserror::Error;

/// Failures of a remote collection call.
///
/// Reported verbatim to the error reporter; the client never formats them
/// itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    /// Transport or connectivity failure, including unreadable responses.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the input (e.g. a duplicate category name).
    #[error("validation error: {0}")]
    Validation(String),

    /// The target id no longer exists server-side.
    #[error("not found")]
    NotFound,
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Network(err.to_string())
    }
}

/// Errors building a gateway from configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API base URL: {raw}")]
    InvalidBaseUrl { raw: String },

    #[error("invalid API timeout: {raw}")]
    InvalidTimeout { raw: String },

    #[error(transparent)]
    Client(#[from] reqwest::Error),
}
