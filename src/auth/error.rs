//! Auth client error types.

use thiserror::Error;

/// Result type for auth operations.
pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Errors that can occur when talking to the Quarry auth service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed before a response was received.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success response; carries the raw body.
    #[error("auth request failed ({status}): {body}")]
    Api { status: u16, body: String },

    /// The configured base URL did not produce a valid request URL.
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}
