//! Scoped scratch files.
//!
//! Document parsers work on filesystem paths and dispatch on extensions,
//! while stored blobs only exist as bytes. A [`ScratchFile`] materializes a
//! blob as a temporary file carrying the original extension and removes it
//! when dropped.

use std::io::Write;
use std::path::Path;

use crate::TRACING_TARGET;
use crate::error::StorageResult;
use crate::path::extension;

/// A temporary on-disk copy of a stored blob, deleted on drop.
#[derive(Debug)]
pub struct ScratchFile {
    file: tempfile::NamedTempFile,
}

impl ScratchFile {
    /// Materializes `data` as a temporary file named after `filename`'s
    /// extension.
    pub fn create(filename: &str, data: &[u8]) -> StorageResult<Self> {
        let suffix = extension(filename)
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let mut file = tempfile::Builder::new()
            .prefix("memtec-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %file.path().display(),
            size = data.len(),
            "Scratch file created"
        );

        Ok(Self { file })
    }

    /// Path of the scratch file on the local filesystem.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_extension_and_content() {
        let scratch = ScratchFile::create("mémoire 2023.pdf", b"%PDF-1.4").unwrap();

        assert_eq!(
            scratch.path().extension().and_then(|e| e.to_str()),
            Some("pdf")
        );
        assert_eq!(std::fs::read(scratch.path()).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn removed_on_drop() {
        let path = {
            let scratch = ScratchFile::create("doc.docx", b"PK").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
