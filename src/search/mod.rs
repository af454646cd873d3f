//! RPC client for the Quarry search service.
//!
//! Queries indexed content chunks on behalf of a user, authenticated by
//! the user's id token carried as call metadata. Each call dials a fresh
//! encrypted channel; the client holds no connection state.

mod chunks;
mod error;
mod filters;
mod proto;

pub use chunks::{Chunk, ChunkMetadata, ChunkReference, RelevantChunk, SourceReference};
pub use error::{Result, SearchError};
pub use filters::{Filters, Query, SearchFilters, TimeSpan};

use async_trait::async_trait;
use tonic::metadata::AsciiMetadataValue;

use crate::config::{self, ConfigError, ConnectionMode};

/// User agent reported as call metadata.
const USER_AGENT: &str = "quarry-sdk-rust";

// ============================================================================
// Gateway trait
// ============================================================================

/// Operations the search service exposes to the rest of the SDK.
///
/// [`SearchClient`] is the RPC implementation; the seam exists so the
/// session orchestrator can be exercised against in-process fakes.
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Search for chunks relevant to a query.
    async fn search_chunks(
        &self,
        id_token: &str,
        query: &Query,
        count: u32,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<RelevantChunk>>;

    /// Fetch all chunks of one document by URL or document name.
    async fn get_document(
        &self,
        id_token: &str,
        reference: &str,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<Chunk>>;
}

// ============================================================================
// SearchClient
// ============================================================================

/// RPC implementation of [`SearchGateway`].
#[derive(Debug, Clone)]
pub struct SearchClient {
    host: String,
    port: u16,
}

impl SearchClient {
    /// Create a client. Host and port overrides must be given together;
    /// with neither, the `internet` endpoints are used.
    pub fn new(host: Option<String>, port: Option<u16>) -> Result<Self, ConfigError> {
        Self::for_mode(ConnectionMode::Internet, host, port)
    }

    /// Create a client with defaults resolved from `mode`.
    pub fn for_mode(
        mode: ConnectionMode,
        host: Option<String>,
        port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        let (host, port) = config::resolve_grpc_endpoint(mode, host, port)?;
        Ok(Self { host, port })
    }

    /// Search for chunks relevant to a query.
    pub async fn search_chunks(
        &self,
        id_token: &str,
        query: &Query,
        count: u32,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<RelevantChunk>> {
        let filters = filters.map(SearchFilters::normalize).transpose()?;
        let request = proto::SearchChunksRequest {
            count: Some(count),
            query: Some(query.clone().into()),
            filters: filters.map(Into::into),
        };

        let mut client = proto::SearchServiceClient::connect(&self.host, self.port).await?;
        let response = client
            .search_chunks(request_with_bearer(request, id_token)?)
            .await?
            .into_inner();

        if !response.success {
            return Err(SearchError::Query {
                detail: proto::error_detail(response.error),
            });
        }
        Ok(response
            .relevant_chunks
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Fetch all chunks of one document by URL or document name.
    pub async fn get_document(
        &self,
        id_token: &str,
        reference: &str,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<Chunk>> {
        let filters = filters.map(SearchFilters::normalize).transpose()?;
        let request = proto::GetDocumentRequest {
            reference: reference.to_string(),
            filters: filters.map(Into::into),
        };

        let mut client = proto::SearchServiceClient::connect(&self.host, self.port).await?;
        let response = client
            .get_document(request_with_bearer(request, id_token)?)
            .await?
            .into_inner();

        if !response.success {
            return Err(SearchError::Query {
                detail: proto::error_detail(response.error),
            });
        }
        Ok(response.chunks.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl SearchGateway for SearchClient {
    async fn search_chunks(
        &self,
        id_token: &str,
        query: &Query,
        count: u32,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<RelevantChunk>> {
        SearchClient::search_chunks(self, id_token, query, count, filters).await
    }

    async fn get_document(
        &self,
        id_token: &str,
        reference: &str,
        filters: Option<SearchFilters>,
    ) -> Result<Vec<Chunk>> {
        SearchClient::get_document(self, id_token, reference, filters).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Wrap a message in a request carrying the user's bearer token.
fn request_with_bearer<T>(message: T, id_token: &str) -> Result<tonic::Request<T>> {
    let bearer = AsciiMetadataValue::try_from(format!("Bearer {id_token}"))
        .map_err(|_| SearchError::InvalidToken)?;

    let mut request = tonic::Request::new(message);
    request.metadata_mut().insert("authorization", bearer);
    request
        .metadata_mut()
        .insert("user-agent", AsciiMetadataValue::from_static(USER_AGENT));
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_defaults_to_internet_endpoints() {
        let client = SearchClient::new(None, None).unwrap();
        assert_eq!(client.host, "grpc.quarry.ai");
        assert_eq!(client.port, 443);
    }

    #[test]
    fn new_rejects_host_without_port() {
        assert!(matches!(
            SearchClient::new(Some("grpc.example.com".to_string()), None),
            Err(ConfigError::PartialEndpoint)
        ));
    }

    #[test]
    fn for_mode_resolves_private_link() {
        let client = SearchClient::for_mode(ConnectionMode::AwsPrivateLink, None, None).unwrap();
        assert_eq!(client.host, "awsprivatelink.quarry.app");
        assert_eq!(client.port, 50443);
    }

    #[test]
    fn bearer_request_carries_token_metadata() {
        let request = request_with_bearer((), "token-1").unwrap();
        assert_eq!(
            request.metadata().get("authorization").unwrap(),
            "Bearer token-1"
        );
        assert_eq!(
            request.metadata().get("user-agent").unwrap(),
            "quarry-sdk-rust"
        );
    }

    #[test]
    fn bearer_request_rejects_non_ascii_token() {
        assert!(matches!(
            request_with_bearer((), "token\n"),
            Err(SearchError::InvalidToken)
        ));
    }
}
