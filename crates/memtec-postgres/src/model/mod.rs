//! Database models for source documents and their chunks.

mod document_chunk;
mod source_document;

pub use document_chunk::{DocumentChunk, NewDocumentChunk, ScoredDocumentChunk, UpdateDocumentChunk};
pub use source_document::{NewSourceDocument, SourceDocument, UpdateSourceDocument};
