//! Chunk data model returned by search operations.
//!
//! A chunk is a unit of indexed document content with provenance
//! metadata. Relevant chunks additionally carry the similarity score the
//! search service assigned against the query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a chunk's document lives in its source system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Source system of the document, e.g. `confluence`, `sharepoint`.
    pub system: String,
    /// Version of the source system.
    pub system_version: String,
    /// Connection id to the source system, e.g. a space or drive id.
    pub connection_id: String,
    /// Document id in the source system.
    pub document_id: String,
    /// Document version in the source system, e.g. a page version or
    /// file hash.
    pub document_version: String,
    /// Document path in the source system.
    pub document_path: Option<String>,
    /// Document name in the source system.
    pub document_name: Option<String>,
}

/// Identity of a chunk within its document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkReference {
    /// Version of the chunking scheme that produced this chunk.
    pub chunking_version: String,
    /// Unique within the document, not globally.
    pub chunk_id: String,
    /// SHA-256 hash of the chunk body.
    pub chunk_hash: String,
}

/// Document metadata carried alongside a chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Content creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Content last-modified timestamp.
    pub modified_at: Option<DateTime<Utc>>,
    /// Link to the document in its source system.
    pub link: Option<String>,
}

/// A unit of indexed document content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source reference of the document.
    pub source: SourceReference,
    /// Chunk reference within the document.
    pub chunk: ChunkReference,
    /// Chunk text.
    pub chunk_body: String,
    /// Document metadata.
    pub document_metadata: ChunkMetadata,
}

/// A chunk scored against a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelevantChunk {
    /// Source reference of the document.
    pub source: SourceReference,
    /// Chunk reference within the document.
    pub chunk: ChunkReference,
    /// Similarity between the chunk and the query.
    pub similarity_score: f32,
    /// Chunk text.
    pub chunk_body: String,
    /// Document metadata.
    pub document_metadata: ChunkMetadata,
}
