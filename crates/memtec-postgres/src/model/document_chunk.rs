//! Document chunk model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use pgvector::Vector;
use uuid::Uuid;

use crate::schema::document_chunks;

/// A text segment of a source document.
///
/// `char_start`/`char_end` are character offsets into the untrimmed
/// extracted full text, so the original span can always be recovered
/// even though `content` is stored trimmed.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = document_chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DocumentChunk {
    /// Unique chunk identifier.
    pub id: Uuid,
    /// Reference to the document this chunk belongs to.
    pub document_id: Uuid,
    /// Zero-based index of this chunk within the document.
    pub chunk_index: i32,
    /// Trimmed chunk text.
    pub content: String,
    /// Character offset where the chunk window starts.
    pub char_start: i32,
    /// Character offset one past the end of the chunk window.
    pub char_end: i32,
    /// Vector embedding for semantic search, absent until embedded.
    pub embedding: Option<Vector>,
    /// Additional metadata (JSON).
    pub metadata: serde_json::Value,
    /// Timestamp when the chunk was created.
    pub created_at: Timestamp,
}

/// Data for creating a new document chunk.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDocumentChunk {
    /// Document ID (required).
    pub document_id: Uuid,
    /// Chunk index within the document.
    pub chunk_index: i32,
    /// Trimmed chunk text (required).
    pub content: String,
    /// Window start offset.
    pub char_start: i32,
    /// Window end offset.
    pub char_end: i32,
    /// Vector embedding, if already computed.
    pub embedding: Option<Vector>,
    /// Metadata.
    pub metadata: Option<serde_json::Value>,
}

/// Data for updating a document chunk.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = document_chunks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateDocumentChunk {
    /// Vector embedding.
    pub embedding: Option<Vector>,
    /// Metadata.
    pub metadata: Option<serde_json::Value>,
}

impl DocumentChunk {
    /// Returns whether the chunk has an embedding stored.
    pub fn is_embedded(&self) -> bool {
        self.embedding.is_some()
    }

    /// Returns the embedding dimensions, if embedded.
    pub fn embedding_dimensions(&self) -> Option<usize> {
        self.embedding.as_ref().map(|e| e.as_slice().len())
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

/// A document chunk with its similarity score.
///
/// Returned from similarity search queries.
#[derive(Debug, Clone)]
pub struct ScoredDocumentChunk {
    /// The document chunk.
    pub chunk: DocumentChunk,
    /// Similarity score (1.0 minus cosine distance, higher is more similar).
    pub score: f64,
}

impl ScoredDocumentChunk {
    /// Returns a reference to the chunk.
    pub fn chunk(&self) -> &DocumentChunk {
        &self.chunk
    }

    /// Returns the similarity score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Consumes self and returns the inner chunk.
    pub fn into_chunk(self) -> DocumentChunk {
        self.chunk
    }
}
