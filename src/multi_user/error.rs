//! Orchestrator error types.

use thiserror::Error;

use crate::auth::{AuthError, ClaimsError};
use crate::search::SearchError;

use super::store::StoreError;

/// Result type for orchestrator operations.
pub type Result<T, E = MultiUserError> = std::result::Result<T, E>;

/// Errors surfaced by [`MultiUserClient`](super::MultiUserClient)
/// operations.
///
/// Service failures are propagated unchanged; the orchestrator adds no
/// retry or backoff. A callback state mismatch is not an error (the
/// callback handler returns `false` instead).
#[derive(Debug, Error)]
pub enum MultiUserError {
    /// The user has no recoverable session; they must connect again.
    #[error("no valid session for user '{user_id}'")]
    InvalidSession { user_id: String },

    /// Auth service failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Search service failure.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// User store failure from the embedding application.
    #[error("user store error: {0}")]
    Store(StoreError),

    /// The stored id token could not be decoded for display.
    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

impl MultiUserError {
    /// Create an invalid-session error for `user_id`.
    pub fn invalid_session(user_id: impl Into<String>) -> Self {
        Self::InvalidSession {
            user_id: user_id.into(),
        }
    }
}
