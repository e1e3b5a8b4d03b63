#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod index;
mod memory;
mod pg;

pub use error::{VectorError, VectorResult};
pub use index::{ChunkRecord, ScoredChunk, SearchFilter, StoredChunk, VectorIndexBackend};
pub use memory::MemoryBackend;
pub use pg::PgBackend;

/// Tracing target for vector index operations.
pub const TRACING_TARGET: &str = "memtec_vector";

/// Embedding dimensions for OpenAI text-embedding-3-small.
pub const DEFAULT_DIMENSIONS: usize = 1536;
