#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod error;
mod path;
mod scratch;

pub use backend::StorageBackend;
pub use config::{FsConfig, S3Config, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use path::{
    ALLOWED_EXTENSIONS, MAX_UPLOAD_BYTES, extract_year, format_file_size, safe_filename,
    storage_path, validate_upload,
};
pub use scratch::ScratchFile;

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "memtec_opendal";
