//! Vector index trait and data types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VectorResult;

/// A chunk to be written into the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Zero-based index within the document.
    pub chunk_index: u32,
    /// Trimmed chunk text.
    pub content: String,
    /// Character offset where the chunk window starts.
    pub char_start: usize,
    /// Character offset one past the end of the chunk window.
    pub char_end: usize,
    /// Embedding, if already computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Additional metadata.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ChunkRecord {
    /// Creates a record without an embedding.
    pub fn new(chunk_index: u32, content: impl Into<String>, span: (usize, usize)) -> Self {
        Self {
            chunk_index,
            content: content.into(),
            char_start: span.0,
            char_end: span.1,
            embedding: None,
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    /// Attaches an embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A chunk as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Chunk identifier.
    pub id: Uuid,
    /// Owning document.
    pub document_id: Uuid,
    /// Zero-based index within the document.
    pub chunk_index: u32,
    /// Trimmed chunk text.
    pub content: String,
    /// Character offset where the chunk window starts.
    pub char_start: usize,
    /// Character offset one past the end of the chunk window.
    pub char_end: usize,
    /// Whether an embedding is stored for this chunk.
    pub embedded: bool,
    /// Additional metadata.
    pub metadata: serde_json::Value,
}

/// A stored chunk with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The stored chunk.
    pub chunk: StoredChunk,
    /// Similarity score (1.0 minus cosine distance, higher is more similar).
    pub score: f64,
}

/// Search filter for similarity queries.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Restrict results to these documents; `None` searches everything.
    pub document_ids: Option<Vec<Uuid>>,
    /// Minimum similarity score to include a result.
    pub min_score: f64,
    /// Maximum number of results to return.
    pub limit: usize,
}

impl SearchFilter {
    /// Creates a filter with the given result limit.
    pub fn new(limit: usize) -> Self {
        Self {
            document_ids: None,
            min_score: 0.0,
            limit,
        }
    }

    /// Restricts the search to specific documents.
    pub fn with_documents(mut self, document_ids: Vec<Uuid>) -> Self {
        self.document_ids = Some(document_ids);
        self
    }

    /// Sets the minimum similarity score.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }
}

/// Trait for vector index backends.
///
/// Implementations guarantee that [`replace_chunks`] is atomic and resets
/// the document's indexed flag, so a re-ingested document never exposes a
/// mix of old and new chunks.
///
/// [`replace_chunks`]: VectorIndexBackend::replace_chunks
#[async_trait]
pub trait VectorIndexBackend: Send + Sync {
    /// Atomically replaces all chunks of a document.
    async fn replace_chunks(
        &self,
        document_id: Uuid,
        chunks: Vec<ChunkRecord>,
    ) -> VectorResult<Vec<StoredChunk>>;

    /// Lists all chunks of a document ordered by chunk index.
    async fn list_chunks(&self, document_id: Uuid) -> VectorResult<Vec<StoredChunk>>;

    /// Stores the embedding for a chunk.
    async fn set_embedding(&self, chunk_id: Uuid, embedding: Vec<f32>) -> VectorResult<()>;

    /// Total number of chunks stored for a document.
    async fn chunk_count(&self, document_id: Uuid) -> VectorResult<u64>;

    /// Number of chunks carrying an embedding.
    async fn embedded_chunk_count(&self, document_id: Uuid) -> VectorResult<u64>;

    /// Sets the indexed flag on a document.
    async fn mark_indexed(&self, document_id: Uuid, indexed: bool) -> VectorResult<()>;

    /// Searches embedded chunks by cosine similarity.
    async fn search(&self, query: Vec<f32>, filter: SearchFilter)
    -> VectorResult<Vec<ScoredChunk>>;

    /// Returns whether every chunk of the document has an embedding.
    ///
    /// A document with zero chunks is not considered fully embedded.
    async fn is_fully_embedded(&self, document_id: Uuid) -> VectorResult<bool> {
        let total = self.chunk_count(document_id).await?;
        if total == 0 {
            return Ok(false);
        }
        let embedded = self.embedded_chunk_count(document_id).await?;
        Ok(embedded == total)
    }
}
