#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod error;
mod indexer;
mod ingest;
pub mod provider;
mod searcher;
mod splitter;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use indexer::{IndexReport, Indexer};
pub use ingest::{IngestReport, IngestService};
pub use provider::{Embedder, EmbeddingBackend, OpenAiEmbedder};
pub use searcher::{SearchResult, SearchScope, Searcher};
pub use splitter::{Splitter, TextChunk};

/// Tracing target for retrieval pipeline operations.
pub const TRACING_TARGET: &str = "memtec_rag";
