//! pgvector-backed index implementation.

use async_trait::async_trait;
use memtec_postgres::model::{DocumentChunk, NewDocumentChunk};
use memtec_postgres::query::{DocumentChunkRepository, SourceDocumentRepository};
use memtec_postgres::{PgClient, PgConfig};
use pgvector::Vector;
use uuid::Uuid;

use crate::TRACING_TARGET;
use crate::error::{VectorError, VectorResult};
use crate::index::{ChunkRecord, ScoredChunk, SearchFilter, StoredChunk, VectorIndexBackend};

/// Vector index backed by PostgreSQL with the pgvector extension.
#[derive(Debug, Clone)]
pub struct PgBackend {
    client: PgClient,
    dimensions: usize,
}

impl PgBackend {
    /// Creates a backend over an existing database client.
    pub fn new(client: PgClient, dimensions: usize) -> Self {
        Self { client, dimensions }
    }

    /// Creates a backend by connecting with the given configuration.
    pub fn connect(config: PgConfig, dimensions: usize) -> VectorResult<Self> {
        let client = PgClient::new(config)?;
        Ok(Self::new(client, dimensions))
    }

    /// Returns the embedding dimensions this index expects.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn check_dimensions(&self, vector: &[f32]) -> VectorResult<()> {
        if vector.len() != self.dimensions {
            return Err(VectorError::dimension_mismatch(
                self.dimensions,
                vector.len(),
            ));
        }
        Ok(())
    }

    fn to_new_chunk(
        &self,
        document_id: Uuid,
        record: ChunkRecord,
    ) -> VectorResult<NewDocumentChunk> {
        if let Some(ref embedding) = record.embedding {
            self.check_dimensions(embedding)?;
        }

        Ok(NewDocumentChunk {
            document_id,
            chunk_index: record.chunk_index as i32,
            content: record.content,
            char_start: record.char_start as i32,
            char_end: record.char_end as i32,
            embedding: record.embedding.map(Vector::from),
            metadata: Some(record.metadata),
        })
    }
}

fn to_stored(chunk: DocumentChunk) -> StoredChunk {
    StoredChunk {
        id: chunk.id,
        document_id: chunk.document_id,
        chunk_index: chunk.chunk_index as u32,
        content: chunk.content,
        char_start: chunk.char_start as usize,
        char_end: chunk.char_end as usize,
        embedded: chunk.embedding.is_some(),
        metadata: chunk.metadata,
    }
}

#[async_trait]
impl VectorIndexBackend for PgBackend {
    async fn replace_chunks(
        &self,
        document_id: Uuid,
        chunks: Vec<ChunkRecord>,
    ) -> VectorResult<Vec<StoredChunk>> {
        let new_chunks = chunks
            .into_iter()
            .map(|record| self.to_new_chunk(document_id, record))
            .collect::<VectorResult<Vec<_>>>()?;

        let mut conn = self.client.get_connection().await?;
        let stored = conn.replace_document_chunks(document_id, new_chunks).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            document_id = %document_id,
            chunks = stored.len(),
            "Replaced document chunks in index"
        );

        Ok(stored.into_iter().map(to_stored).collect())
    }

    async fn list_chunks(&self, document_id: Uuid) -> VectorResult<Vec<StoredChunk>> {
        let mut conn = self.client.get_connection().await?;
        let chunks = conn.list_document_chunks(document_id).await?;
        Ok(chunks.into_iter().map(to_stored).collect())
    }

    async fn set_embedding(&self, chunk_id: Uuid, embedding: Vec<f32>) -> VectorResult<()> {
        self.check_dimensions(&embedding)?;

        let mut conn = self.client.get_connection().await?;
        conn.set_chunk_embedding(chunk_id, Vector::from(embedding))
            .await?;
        Ok(())
    }

    async fn chunk_count(&self, document_id: Uuid) -> VectorResult<u64> {
        let mut conn = self.client.get_connection().await?;
        let count = conn.count_document_chunks(document_id).await?;
        Ok(count as u64)
    }

    async fn embedded_chunk_count(&self, document_id: Uuid) -> VectorResult<u64> {
        let mut conn = self.client.get_connection().await?;
        let count = conn.count_embedded_chunks(document_id).await?;
        Ok(count as u64)
    }

    async fn mark_indexed(&self, document_id: Uuid, indexed: bool) -> VectorResult<()> {
        let mut conn = self.client.get_connection().await?;
        conn.mark_document_indexed(document_id, indexed).await?;
        Ok(())
    }

    async fn search(
        &self,
        query: Vec<f32>,
        filter: SearchFilter,
    ) -> VectorResult<Vec<ScoredChunk>> {
        self.check_dimensions(&query)?;

        let embedding = Vector::from(query);
        let limit = filter.limit as i64;
        let mut conn = self.client.get_connection().await?;

        let scored = match filter.document_ids {
            Some(ref ids) => {
                conn.search_scored_chunks_in_documents(embedding, ids, filter.min_score, limit)
                    .await?
            }
            None => {
                conn.search_scored_chunks(embedding, filter.min_score, limit)
                    .await?
            }
        };

        Ok(scored
            .into_iter()
            .map(|scored| ScoredChunk {
                score: scored.score,
                chunk: to_stored(scored.chunk),
            })
            .collect())
    }
}
