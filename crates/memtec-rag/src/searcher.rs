//! Semantic search over indexed chunks.

use std::sync::Arc;

use memtec_vector::{ScoredChunk, SearchFilter, VectorIndexBackend};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TRACING_TARGET;
use crate::config::RagConfig;
use crate::provider::Embedder;
use crate::{Error, Result};

/// Scope of a similarity search.
#[derive(Debug, Clone, Default)]
pub enum SearchScope {
    /// Search every indexed document.
    #[default]
    All,
    /// Search only the given documents.
    Documents(Vec<Uuid>),
}

/// A chunk retrieved by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Chunk identifier.
    pub chunk_id: Uuid,
    /// Owning document.
    pub document_id: Uuid,
    /// Zero-based index within the document.
    pub chunk_index: u32,
    /// Chunk text.
    pub content: String,
    /// Character offset where the chunk window starts.
    pub char_start: usize,
    /// Character offset one past the end of the chunk window.
    pub char_end: usize,
    /// Chunk metadata.
    pub metadata: serde_json::Value,
    /// Similarity to the query (1.0 minus cosine distance).
    pub similarity: f64,
}

impl From<ScoredChunk> for SearchResult {
    fn from(scored: ScoredChunk) -> Self {
        let chunk = scored.chunk;
        Self {
            chunk_id: chunk.id,
            document_id: chunk.document_id,
            chunk_index: chunk.chunk_index,
            content: chunk.content,
            char_start: chunk.char_start,
            char_end: chunk.char_end,
            metadata: chunk.metadata,
            similarity: scored.score,
        }
    }
}

/// Semantic search service for indexed chunks.
pub struct Searcher {
    embedder: Embedder,
    index: Arc<dyn VectorIndexBackend>,
    max_results: usize,
    min_score: Option<f64>,
}

impl Searcher {
    /// Creates a search service from pipeline configuration.
    pub fn new(
        embedder: Embedder,
        index: Arc<dyn VectorIndexBackend>,
        config: &RagConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            max_results: config.max_results,
            min_score: config.min_score,
        }
    }

    /// Sets the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Searches with the configured result limit.
    pub async fn query(&self, query: &str, scope: SearchScope) -> Result<Vec<SearchResult>> {
        self.query_with_limit(query, scope, self.max_results).await
    }

    /// Searches for the `limit` most similar chunks.
    pub async fn query_with_limit(
        &self,
        query: &str,
        scope: SearchScope,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(Error::retrieval("query must not be empty"));
        }

        let embedding = self.embedder.embed_one(query).await?;

        let mut filter = SearchFilter::new(limit);
        if let Some(min_score) = self.min_score {
            filter = filter.with_min_score(min_score);
        }
        if let SearchScope::Documents(ids) = scope {
            filter = filter.with_documents(ids);
        }

        let scored = self.index.search(embedding, filter).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            results = scored.len(),
            limit,
            min_score = ?self.min_score,
            "Similarity search finished"
        );

        Ok(scored.into_iter().map(SearchResult::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use memtec_vector::{ChunkRecord, MemoryBackend};

    use super::*;
    use crate::provider::MockEmbedder;

    // The mock embeds text as [1.0, char_count, 0.0, 0.0], so stored
    // embeddings below are chosen relative to a 4-character query.
    fn aligned(len: f32) -> Vec<f32> {
        vec![1.0, len, 0.0, 0.0]
    }

    async fn seeded_index() -> (Arc<MemoryBackend>, Uuid, Uuid) {
        let index = Arc::new(MemoryBackend::new(4));
        let doc_a = Uuid::new_v4();
        let doc_b = Uuid::new_v4();

        index
            .replace_chunks(
                doc_a,
                vec![
                    ChunkRecord::new(0, "parfaitement aligne", (0, 19))
                        .with_embedding(aligned(4.0)),
                    ChunkRecord::new(1, "orthogonal", (19, 29))
                        .with_embedding(vec![0.0, 0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();
        index
            .replace_chunks(
                doc_b,
                vec![ChunkRecord::new(0, "autre document", (0, 14)).with_embedding(aligned(4.0))],
            )
            .await
            .unwrap();

        (index, doc_a, doc_b)
    }

    fn searcher(index: Arc<MemoryBackend>) -> Searcher {
        Searcher::new(
            Embedder::new(Arc::new(MockEmbedder::new(4))),
            index,
            &RagConfig::default(),
        )
    }

    #[tokio::test]
    async fn returns_most_similar_chunks_first() {
        let (index, _, _) = seeded_index().await;
        let results = searcher(index).query("abcd", SearchScope::All).await.unwrap();

        assert_eq!(results.len(), 3);
        assert!((results[0].similarity - 1.0).abs() < 1e-9);
        assert!(results[0].similarity >= results[1].similarity);
        assert!(results[1].similarity >= results[2].similarity);
    }

    #[tokio::test]
    async fn scope_restricts_to_requested_documents() {
        let (index, doc_a, _) = seeded_index().await;
        let results = searcher(index)
            .query("abcd", SearchScope::Documents(vec![doc_a]))
            .await
            .unwrap();

        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.document_id == doc_a));
    }

    #[tokio::test]
    async fn min_score_filters_weak_matches() {
        let (index, _, _) = seeded_index().await;
        let results = searcher(index)
            .with_min_score(0.9)
            .query("abcd", SearchScope::All)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.similarity >= 0.9));
    }

    #[tokio::test]
    async fn limit_caps_result_count() {
        let (index, _, _) = seeded_index().await;
        let results = searcher(index)
            .query_with_limit("abcd", SearchScope::All, 1)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn empty_query_is_rejected() {
        let (index, _, _) = seeded_index().await;
        let err = searcher(index)
            .query("   ", SearchScope::All)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Retrieval(_)));
    }
}
