//! Search client error types.

use thiserror::Error;

/// Result type for search operations.
pub type Result<T, E = SearchError> = std::result::Result<T, E>;

/// Errors that can occur when querying the Quarry search service.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Failed to establish the RPC channel.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// The RPC call itself failed.
    #[error("rpc failed: {0}")]
    Status(#[from] tonic::Status),

    /// The bearer token contains characters that cannot be carried as
    /// call metadata.
    #[error("id token is not valid call metadata")]
    InvalidToken,

    /// The service reported an unsuccessful query.
    #[error("query failed: {detail}")]
    Query { detail: String },

    /// A raw filter mapping did not match the filter schema.
    #[error("invalid filters: {0}")]
    Filters(#[source] serde_json::Error),
}
