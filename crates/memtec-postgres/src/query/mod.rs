//! Repository traits implemented on [`PgConnection`].
//!
//! [`PgConnection`]: crate::PgConnection

mod document_chunk;
mod source_document;

pub use document_chunk::DocumentChunkRepository;
pub use source_document::SourceDocumentRepository;
