//! Exact in-memory index implementation.
//!
//! Brute-force cosine similarity over every stored embedding. Intended for
//! tests and small corpora where an external index is not worth running.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{VectorError, VectorResult};
use crate::index::{ChunkRecord, ScoredChunk, SearchFilter, StoredChunk, VectorIndexBackend};

#[derive(Debug, Clone)]
struct MemChunk {
    id: Uuid,
    chunk_index: u32,
    content: String,
    char_start: usize,
    char_end: usize,
    embedding: Option<Vec<f32>>,
    metadata: serde_json::Value,
}

#[derive(Debug, Default)]
struct DocumentEntry {
    chunks: Vec<MemChunk>,
    indexed: bool,
}

/// In-memory vector index with exact search.
#[derive(Debug)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<Uuid, DocumentEntry>>,
    dimensions: usize,
}

impl MemoryBackend {
    /// Creates an empty index expecting the given embedding dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            dimensions,
        }
    }

    /// Returns the embedding dimensions this index expects.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns the indexed flag of a document (false when unknown).
    pub async fn is_indexed(&self, document_id: Uuid) -> bool {
        let documents = self.documents.read().await;
        documents.get(&document_id).is_some_and(|entry| entry.indexed)
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
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

fn to_stored(document_id: Uuid, chunk: &MemChunk) -> StoredChunk {
    StoredChunk {
        id: chunk.id,
        document_id,
        chunk_index: chunk.chunk_index,
        content: chunk.content.clone(),
        char_start: chunk.char_start,
        char_end: chunk.char_end,
        embedded: chunk.embedding.is_some(),
        metadata: chunk.metadata.clone(),
    }
}

#[async_trait]
impl VectorIndexBackend for MemoryBackend {
    async fn replace_chunks(
        &self,
        document_id: Uuid,
        chunks: Vec<ChunkRecord>,
    ) -> VectorResult<Vec<StoredChunk>> {
        for record in &chunks {
            if let Some(ref embedding) = record.embedding {
                self.check_dimensions(embedding)?;
            }
        }

        let mem_chunks: Vec<MemChunk> = chunks
            .into_iter()
            .map(|record| MemChunk {
                id: Uuid::new_v4(),
                chunk_index: record.chunk_index,
                content: record.content,
                char_start: record.char_start,
                char_end: record.char_end,
                embedding: record.embedding,
                metadata: record.metadata,
            })
            .collect();

        let mut documents = self.documents.write().await;
        let entry = documents.entry(document_id).or_default();
        entry.chunks = mem_chunks;
        entry.indexed = false;

        Ok(entry
            .chunks
            .iter()
            .map(|chunk| to_stored(document_id, chunk))
            .collect())
    }

    async fn list_chunks(&self, document_id: Uuid) -> VectorResult<Vec<StoredChunk>> {
        let documents = self.documents.read().await;
        let Some(entry) = documents.get(&document_id) else {
            return Ok(vec![]);
        };

        let mut chunks: Vec<StoredChunk> = entry
            .chunks
            .iter()
            .map(|chunk| to_stored(document_id, chunk))
            .collect();
        chunks.sort_by_key(|chunk| chunk.chunk_index);

        Ok(chunks)
    }

    async fn set_embedding(&self, chunk_id: Uuid, embedding: Vec<f32>) -> VectorResult<()> {
        self.check_dimensions(&embedding)?;

        let mut documents = self.documents.write().await;
        for entry in documents.values_mut() {
            if let Some(chunk) = entry.chunks.iter_mut().find(|chunk| chunk.id == chunk_id) {
                chunk.embedding = Some(embedding);
                return Ok(());
            }
        }

        Err(VectorError::not_found(format!("chunk {chunk_id}")))
    }

    async fn chunk_count(&self, document_id: Uuid) -> VectorResult<u64> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&document_id)
            .map_or(0, |entry| entry.chunks.len() as u64))
    }

    async fn embedded_chunk_count(&self, document_id: Uuid) -> VectorResult<u64> {
        let documents = self.documents.read().await;
        Ok(documents.get(&document_id).map_or(0, |entry| {
            entry
                .chunks
                .iter()
                .filter(|chunk| chunk.embedding.is_some())
                .count() as u64
        }))
    }

    async fn mark_indexed(&self, document_id: Uuid, indexed: bool) -> VectorResult<()> {
        let mut documents = self.documents.write().await;
        let entry = documents
            .get_mut(&document_id)
            .ok_or_else(|| VectorError::not_found(format!("document {document_id}")))?;
        entry.indexed = indexed;
        Ok(())
    }

    async fn search(
        &self,
        query: Vec<f32>,
        filter: SearchFilter,
    ) -> VectorResult<Vec<ScoredChunk>> {
        self.check_dimensions(&query)?;

        let documents = self.documents.read().await;
        let mut results: Vec<ScoredChunk> = Vec::new();

        for (&document_id, entry) in documents.iter() {
            if let Some(ref ids) = filter.document_ids
                && !ids.contains(&document_id)
            {
                continue;
            }

            for chunk in &entry.chunks {
                let Some(ref embedding) = chunk.embedding else {
                    continue;
                };

                let score = cosine_similarity(&query, embedding);
                if score >= filter.min_score {
                    results.push(ScoredChunk {
                        chunk: to_stored(document_id, chunk),
                        score,
                    });
                }
            }
        }

        // Descending by score with a stable tie-break on identity.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.document_id.cmp(&b.chunk.document_id))
                .then_with(|| a.chunk.chunk_index.cmp(&b.chunk.chunk_index))
        });
        results.truncate(filter.limit);

        Ok(results)
    }
}
