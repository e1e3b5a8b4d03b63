//! Document chunk repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use pgvector::Vector;
use uuid::Uuid;

use crate::model::{DocumentChunk, NewDocumentChunk, ScoredDocumentChunk, UpdateDocumentChunk};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for document chunk database operations.
///
/// Handles chunk lifecycle management including atomic replacement,
/// embedding updates, and semantic similarity search via pgvector.
pub trait DocumentChunkRepository {
    /// Atomically replaces all chunks of a document.
    ///
    /// Runs in a single transaction: existing chunks are deleted, the new
    /// ones inserted, and the document's indexed flag reset, so re-ingestion
    /// never leaves a mix of old and new chunks behind.
    fn replace_document_chunks(
        &mut self,
        document_id: Uuid,
        new_chunks: Vec<NewDocumentChunk>,
    ) -> impl Future<Output = PgResult<Vec<DocumentChunk>>> + Send;

    /// Lists all chunks of a document ordered by chunk index.
    fn list_document_chunks(
        &mut self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<DocumentChunk>>> + Send;

    /// Gets the total chunk count for a document.
    fn count_document_chunks(
        &mut self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Gets the count of chunks carrying an embedding.
    fn count_embedded_chunks(
        &mut self,
        document_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;

    /// Updates a chunk with new data.
    fn update_document_chunk(
        &mut self,
        chunk_id: Uuid,
        updates: UpdateDocumentChunk,
    ) -> impl Future<Output = PgResult<DocumentChunk>> + Send;

    /// Stores the embedding for a chunk.
    fn set_chunk_embedding(
        &mut self,
        chunk_id: Uuid,
        embedding: Vector,
    ) -> impl Future<Output = PgResult<DocumentChunk>> + Send;

    /// Searches embedded chunks by cosine similarity.
    ///
    /// Returns chunks with similarity score >= `min_score`, most similar
    /// first.
    fn search_scored_chunks(
        &mut self,
        query_embedding: Vector,
        min_score: f64,
        limit: i64,
    ) -> impl Future<Output = PgResult<Vec<ScoredDocumentChunk>>> + Send;

    /// Searches embedded chunks of specific documents by cosine similarity.
    fn search_scored_chunks_in_documents(
        &mut self,
        query_embedding: Vector,
        document_ids: &[Uuid],
        min_score: f64,
        limit: i64,
    ) -> impl Future<Output = PgResult<Vec<ScoredDocumentChunk>>> + Send;
}

impl DocumentChunkRepository for PgConnection {
    async fn replace_document_chunks(
        &mut self,
        document_id: Uuid,
        new_chunks: Vec<NewDocumentChunk>,
    ) -> PgResult<Vec<DocumentChunk>> {
        use diesel_async::AsyncConnection;
        use schema::document_chunks::{self, dsl};
        use schema::source_documents;

        let chunks = self
            .transaction::<_, PgError, _>(|conn| {
                async move {
                    let deleted = diesel::delete(
                        document_chunks::table.filter(dsl::document_id.eq(document_id)),
                    )
                    .execute(conn)
                    .await?;

                    diesel::update(
                        source_documents::table.filter(source_documents::id.eq(document_id)),
                    )
                    .set((
                        source_documents::indexed.eq(false),
                        source_documents::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .await?;

                    let chunks = if new_chunks.is_empty() {
                        vec![]
                    } else {
                        diesel::insert_into(document_chunks::table)
                            .values(&new_chunks)
                            .returning(DocumentChunk::as_returning())
                            .get_results(conn)
                            .await?
                    };

                    tracing::debug!(
                        target: TRACING_TARGET_QUERY,
                        document_id = %document_id,
                        deleted,
                        inserted = chunks.len(),
                        "Replaced document chunks"
                    );

                    Ok(chunks)
                }
                .scope_boxed()
            })
            .await?;

        Ok(chunks)
    }

    async fn list_document_chunks(&mut self, document_id: Uuid) -> PgResult<Vec<DocumentChunk>> {
        use schema::document_chunks::{self, dsl};

        let chunks = document_chunks::table
            .filter(dsl::document_id.eq(document_id))
            .order(dsl::chunk_index.asc())
            .select(DocumentChunk::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(chunks)
    }

    async fn count_document_chunks(&mut self, document_id: Uuid) -> PgResult<i64> {
        use schema::document_chunks::{self, dsl};

        let count = document_chunks::table
            .filter(dsl::document_id.eq(document_id))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }

    async fn count_embedded_chunks(&mut self, document_id: Uuid) -> PgResult<i64> {
        use schema::document_chunks::{self, dsl};

        let count = document_chunks::table
            .filter(dsl::document_id.eq(document_id))
            .filter(dsl::embedding.is_not_null())
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }

    async fn update_document_chunk(
        &mut self,
        chunk_id: Uuid,
        updates: UpdateDocumentChunk,
    ) -> PgResult<DocumentChunk> {
        use schema::document_chunks::{self, dsl};

        let chunk = diesel::update(document_chunks::table.filter(dsl::id.eq(chunk_id)))
            .set(&updates)
            .returning(DocumentChunk::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(chunk)
    }

    async fn set_chunk_embedding(
        &mut self,
        chunk_id: Uuid,
        embedding: Vector,
    ) -> PgResult<DocumentChunk> {
        use schema::document_chunks::{self, dsl};

        let chunk = diesel::update(document_chunks::table.filter(dsl::id.eq(chunk_id)))
            .set(dsl::embedding.eq(Some(embedding)))
            .returning(DocumentChunk::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(chunk)
    }

    async fn search_scored_chunks(
        &mut self,
        query_embedding: Vector,
        min_score: f64,
        limit: i64,
    ) -> PgResult<Vec<ScoredDocumentChunk>> {
        use pgvector::VectorExpressionMethods;
        use schema::document_chunks::{self, dsl};

        // Cosine distance ranges from 0 (identical) to 2 (opposite).
        // Score = 1 - distance, so min_score maps to max_distance = 1 - min_score.
        let max_distance = 1.0 - min_score;

        let chunks: Vec<(DocumentChunk, f64)> = document_chunks::table
            .filter(dsl::embedding.is_not_null())
            .filter(
                dsl::embedding
                    .cosine_distance(&query_embedding)
                    .le(max_distance),
            )
            .order(dsl::embedding.cosine_distance(&query_embedding))
            .limit(limit)
            .select((
                DocumentChunk::as_select(),
                // The is_not_null filter above guarantees a distance row.
                (1.0.into_sql::<diesel::sql_types::Double>()
                    - dsl::embedding
                        .cosine_distance(&query_embedding)
                        .assume_not_null()),
            ))
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(chunks
            .into_iter()
            .map(|(chunk, score)| ScoredDocumentChunk { chunk, score })
            .collect())
    }

    async fn search_scored_chunks_in_documents(
        &mut self,
        query_embedding: Vector,
        document_ids: &[Uuid],
        min_score: f64,
        limit: i64,
    ) -> PgResult<Vec<ScoredDocumentChunk>> {
        use pgvector::VectorExpressionMethods;
        use schema::document_chunks::{self, dsl};

        if document_ids.is_empty() {
            return Ok(vec![]);
        }

        let max_distance = 1.0 - min_score;

        let chunks: Vec<(DocumentChunk, f64)> = document_chunks::table
            .filter(dsl::document_id.eq_any(document_ids))
            .filter(dsl::embedding.is_not_null())
            .filter(
                dsl::embedding
                    .cosine_distance(&query_embedding)
                    .le(max_distance),
            )
            .order(dsl::embedding.cosine_distance(&query_embedding))
            .limit(limit)
            .select((
                DocumentChunk::as_select(),
                (1.0.into_sql::<diesel::sql_types::Double>()
                    - dsl::embedding
                        .cosine_distance(&query_embedding)
                        .assume_not_null()),
            ))
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(chunks
            .into_iter()
            .map(|(chunk, score)| ScoredDocumentChunk { chunk, score })
            .collect())
    }
}
