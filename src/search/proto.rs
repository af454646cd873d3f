//! Wire messages and RPC stub for the search service.
//!
//! The service speaks protobuf over gRPC; the messages here mirror the
//! platform's published schema (`quarry.search.v2`). A fresh TLS channel
//! is dialed per call; the client assumes no connection reuse.

use chrono::{DateTime, Utc};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use super::chunks;
use super::filters;

// ============================================================================
// Messages
// ============================================================================

#[derive(Clone, PartialEq, prost::Message)]
pub struct ChunkMetadata {
    #[prost(message, optional, tag = "1")]
    pub created_at: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub modified_at: Option<prost_types::Timestamp>,
    #[prost(string, optional, tag = "3")]
    pub link: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SourceReference {
    #[prost(string, tag = "1")]
    pub system: String,
    #[prost(string, tag = "2")]
    pub system_version: String,
    #[prost(string, tag = "3")]
    pub connection_id: String,
    #[prost(string, tag = "4")]
    pub document_id: String,
    #[prost(string, tag = "5")]
    pub document_version: String,
    #[prost(string, optional, tag = "6")]
    pub document_path: Option<String>,
    #[prost(string, optional, tag = "7")]
    pub document_name: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ChunkReference {
    #[prost(string, tag = "1")]
    pub chunking_version: String,
    #[prost(string, tag = "2")]
    pub chunk_id: String,
    #[prost(string, tag = "3")]
    pub chunk_hash: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RelevantChunkRelevance {
    #[prost(float, tag = "1")]
    pub similarity_score: f32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct RelevantChunk {
    #[prost(message, optional, tag = "1")]
    pub source: Option<SourceReference>,
    #[prost(message, optional, tag = "2")]
    pub chunk: Option<ChunkReference>,
    #[prost(message, optional, tag = "3")]
    pub relevance: Option<RelevantChunkRelevance>,
    #[prost(string, tag = "4")]
    pub chunk_body: String,
    #[prost(message, optional, tag = "5")]
    pub document_metadata: Option<ChunkMetadata>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Chunk {
    #[prost(message, optional, tag = "1")]
    pub source: Option<SourceReference>,
    #[prost(message, optional, tag = "2")]
    pub chunk: Option<ChunkReference>,
    #[prost(string, tag = "3")]
    pub chunk_body: String,
    #[prost(message, optional, tag = "4")]
    pub document_metadata: Option<ChunkMetadata>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Query {
    #[prost(string, optional, tag = "1")]
    pub semantic_query: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub keyword_query: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TimeSpan {
    #[prost(message, optional, tag = "1")]
    pub after: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "2")]
    pub before: Option<prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Filters {
    #[prost(string, repeated, tag = "1")]
    pub scope: Vec<String>,
    #[prost(message, optional, tag = "2")]
    pub created: Option<TimeSpan>,
    #[prost(message, optional, tag = "3")]
    pub modified: Option<TimeSpan>,
    #[prost(string, repeated, tag = "4")]
    pub user_emails: Vec<String>,
    #[prost(bool, optional, tag = "5")]
    pub include_content_in_trash: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SearchChunksRequest {
    #[prost(uint32, optional, tag = "1")]
    pub count: Option<u32>,
    #[prost(message, optional, tag = "2")]
    pub query: Option<Query>,
    #[prost(message, optional, tag = "3")]
    pub filters: Option<Filters>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetDocumentRequest {
    #[prost(string, tag = "1")]
    pub reference: String,
    #[prost(message, optional, tag = "2")]
    pub filters: Option<Filters>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SearchChunksResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub error: Option<prost_types::Struct>,
    #[prost(message, repeated, tag = "3")]
    pub relevant_chunks: Vec<RelevantChunk>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetDocumentResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, optional, tag = "2")]
    pub error: Option<prost_types::Struct>,
    #[prost(message, repeated, tag = "3")]
    pub chunks: Vec<Chunk>,
}

// ============================================================================
// RPC stub
// ============================================================================

/// Unary RPC stub for the `quarry.search.v2.Search` service.
#[derive(Debug, Clone)]
pub struct SearchServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl SearchServiceClient {
    /// Dial a TLS channel to `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(format!("https://{host}:{port}"))?
            .tls_config(ClientTlsConfig::new().with_native_roots())?
            .connect()
            .await?;
        Ok(Self {
            inner: tonic::client::Grpc::new(channel),
        })
    }

    pub async fn search_chunks(
        &mut self,
        request: tonic::Request<SearchChunksRequest>,
    ) -> Result<tonic::Response<SearchChunksResponse>, tonic::Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unknown(format!("service not ready: {e}")))?;
        let codec: tonic::codec::ProstCodec<SearchChunksRequest, SearchChunksResponse> =
            tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/quarry.search.v2.Search/SearchChunks");
        self.inner.unary(request, path, codec).await
    }

    pub async fn get_document(
        &mut self,
        request: tonic::Request<GetDocumentRequest>,
    ) -> Result<tonic::Response<GetDocumentResponse>, tonic::Status> {
        self.inner
            .ready()
            .await
            .map_err(|e| tonic::Status::unknown(format!("service not ready: {e}")))?;
        let codec: tonic::codec::ProstCodec<GetDocumentRequest, GetDocumentResponse> =
            tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/quarry.search.v2.Search/GetDocument");
        self.inner.unary(request, path, codec).await
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn to_timestamp(datetime: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: datetime.timestamp(),
        nanos: datetime.timestamp_subsec_nanos() as i32,
    }
}

fn from_timestamp(timestamp: prost_types::Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.seconds, timestamp.nanos.max(0) as u32)
}

impl From<filters::Query> for Query {
    fn from(query: filters::Query) -> Self {
        Self {
            semantic_query: query.semantic_query,
            keyword_query: query.keyword_query,
        }
    }
}

impl From<filters::TimeSpan> for TimeSpan {
    fn from(span: filters::TimeSpan) -> Self {
        Self {
            after: span.after.map(to_timestamp),
            before: span.before.map(to_timestamp),
        }
    }
}

impl From<filters::Filters> for Filters {
    fn from(filters: filters::Filters) -> Self {
        Self {
            scope: filters.scope,
            created: filters.created.map(Into::into),
            modified: filters.modified.map(Into::into),
            user_emails: filters.user_emails,
            include_content_in_trash: filters.include_content_in_trash,
        }
    }
}

impl From<SourceReference> for chunks::SourceReference {
    fn from(source: SourceReference) -> Self {
        Self {
            system: source.system,
            system_version: source.system_version,
            connection_id: source.connection_id,
            document_id: source.document_id,
            document_version: source.document_version,
            document_path: source.document_path,
            document_name: source.document_name,
        }
    }
}

impl From<ChunkReference> for chunks::ChunkReference {
    fn from(reference: ChunkReference) -> Self {
        Self {
            chunking_version: reference.chunking_version,
            chunk_id: reference.chunk_id,
            chunk_hash: reference.chunk_hash,
        }
    }
}

impl From<ChunkMetadata> for chunks::ChunkMetadata {
    fn from(metadata: ChunkMetadata) -> Self {
        Self {
            created_at: metadata.created_at.and_then(from_timestamp),
            modified_at: metadata.modified_at.and_then(from_timestamp),
            link: metadata.link,
        }
    }
}

impl From<Chunk> for chunks::Chunk {
    fn from(chunk: Chunk) -> Self {
        Self {
            source: chunk.source.map(Into::into).unwrap_or_default(),
            chunk: chunk.chunk.map(Into::into).unwrap_or_default(),
            chunk_body: chunk.chunk_body,
            document_metadata: chunk.document_metadata.map(Into::into).unwrap_or_default(),
        }
    }
}

impl From<RelevantChunk> for chunks::RelevantChunk {
    fn from(chunk: RelevantChunk) -> Self {
        Self {
            source: chunk.source.map(Into::into).unwrap_or_default(),
            chunk: chunk.chunk.map(Into::into).unwrap_or_default(),
            similarity_score: chunk
                .relevance
                .map(|relevance| relevance.similarity_score)
                .unwrap_or_default(),
            chunk_body: chunk.chunk_body,
            document_metadata: chunk.document_metadata.map(Into::into).unwrap_or_default(),
        }
    }
}

/// Render the service's error struct as JSON text for error messages.
pub(crate) fn error_detail(error: Option<prost_types::Struct>) -> String {
    match error {
        Some(fields) => serde_json::Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(key, value)| (key, value_to_json(value)))
                .collect(),
        )
        .to_string(),
        None => "unknown error".to_string(),
    }
}

fn value_to_json(value: prost_types::Value) -> serde_json::Value {
    use prost_types::value::Kind;

    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::NumberValue(number)) => serde_json::Number::from_f64(number)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(string)) => serde_json::Value::String(string),
        Some(Kind::BoolValue(boolean)) => serde_json::Value::Bool(boolean),
        Some(Kind::StructValue(fields)) => serde_json::Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(key, value)| (key, value_to_json(value)))
                .collect(),
        ),
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(value_to_json).collect(),
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
