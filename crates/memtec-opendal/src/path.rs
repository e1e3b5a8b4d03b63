//! Upload validation and storage path helpers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{StorageError, StorageResult};

/// Extensions accepted for source documents (lowercase, without the dot).
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "doc"];

/// Maximum accepted upload size (50 MB).
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("valid regex"));

static UNDERSCORE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_+").expect("valid regex"));

// Underscore is a word character, so `\b` would miss `_2023_`; bound the
// year by non-digits instead.
static YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])(19\d{2}|20\d{2})(?:[^0-9]|$)").expect("valid regex")
});

/// Validates an upload before it reaches storage.
///
/// Rejects missing or unsupported extensions, empty files, and files over
/// [`MAX_UPLOAD_BYTES`].
pub fn validate_upload(filename: &str, size: u64) -> StorageResult<()> {
    let Some(ext) = extension(filename) else {
        return Err(StorageError::invalid_upload("file has no extension"));
    };

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(StorageError::invalid_upload(format!(
            "unsupported file type '.{ext}', only .pdf, .docx and .doc are allowed"
        )));
    }

    if size == 0 {
        return Err(StorageError::invalid_upload("file is empty"));
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(StorageError::invalid_upload(format!(
            "file size ({}) exceeds maximum allowed size of {}",
            format_file_size(size),
            format_file_size(MAX_UPLOAD_BYTES),
        )));
    }

    Ok(())
}

/// Generates a collision-resistant storage-safe filename.
///
/// The stem keeps only ASCII alphanumerics, `_` and `-`, and gets a
/// timestamp suffix so repeated uploads of the same file never collide.
/// The extension is preserved lowercased.
pub fn safe_filename(original: &str) -> String {
    let stem = sanitize_stem(original);
    let timestamp = jiff::Zoned::now().strftime("%Y%m%d_%H%M%S");

    match extension(original) {
        Some(ext) => format!("{stem}_{timestamp}.{ext}"),
        None => format!("{stem}_{timestamp}"),
    }
}

/// Generates the storage path for a source document.
pub fn storage_path(prefix: &str, filename: &str) -> String {
    format!("{prefix}/{}", safe_filename(filename))
}

/// Extracts a four-digit year (1900-2099) from a filename, if present.
pub fn extract_year(filename: &str) -> Option<i32> {
    YEAR.captures(filename)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Formats a byte count for messages ("1.5 MB", "500 KB").
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes < 1024 {
        format!("{size_bytes} B")
    } else if size_bytes < 1024 * 1024 {
        format!("{:.2} KB", size_bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", size_bytes as f64 / (1024.0 * 1024.0))
    }
}

fn sanitize_stem(original: &str) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };

    let safe = UNSAFE_CHARS.replace_all(stem, "_");
    let safe = UNDERSCORE_RUN.replace_all(&safe, "_");
    let safe = safe.trim_matches('_');

    if safe.is_empty() {
        format!("file_{}", &uuid::Uuid::new_v4().simple().to_string()[..8])
    } else {
        safe.to_string()
    }
}

pub(crate) fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_extensions_case_insensitively() {
        validate_upload("memoire_2023.pdf", 1024).unwrap();
        validate_upload("MEMOIRE.DOCX", 1024).unwrap();
        validate_upload("ancien.doc", 1024).unwrap();
    }

    #[test]
    fn rejects_unsupported_or_missing_extension() {
        let err = validate_upload("notes.txt", 1024).unwrap_err();
        assert!(matches!(err, StorageError::InvalidUpload(_)));

        let err = validate_upload("sans_extension", 1024).unwrap_err();
        assert!(matches!(err, StorageError::InvalidUpload(_)));
    }

    #[test]
    fn rejects_empty_and_oversized_files() {
        let err = validate_upload("memoire.pdf", 0).unwrap_err();
        assert!(matches!(err, StorageError::InvalidUpload(_)));

        let err = validate_upload("memoire.pdf", MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(matches!(err, StorageError::InvalidUpload(_)));

        validate_upload("memoire.pdf", MAX_UPLOAD_BYTES).unwrap();
    }

    #[test]
    fn sanitizes_accents_and_spaces_in_stems() {
        assert_eq!(sanitize_stem("mémoire technique 2023.pdf"), "m_moire_technique_2023");
        assert_eq!(sanitize_stem("__weird---name__.docx"), "weird---name");
    }

    #[test]
    fn empty_stem_gets_a_generated_name() {
        let stem = sanitize_stem("éà.pdf");
        assert!(stem.starts_with("file_"));
        assert_eq!(stem.len(), "file_".len() + 8);
    }

    #[test]
    fn safe_filename_keeps_lowercased_extension() {
        let name = safe_filename("Mémoire Technique.PDF");
        assert!(name.starts_with("M_moire_Technique_"));
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn storage_path_is_prefixed() {
        let path = storage_path("memoires", "dossier.pdf");
        assert!(path.starts_with("memoires/dossier_"));
    }

    #[test]
    fn year_extraction() {
        assert_eq!(extract_year("memoire_technique_2023.pdf"), Some(2023));
        assert_eq!(extract_year("appel_offre_1998_final.docx"), Some(1998));
        assert_eq!(extract_year("memoire_v12345.pdf"), None);
        assert_eq!(extract_year("memoire.pdf"), None);
    }

    #[test]
    fn file_size_formatting() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(50 * 1024 * 1024), "50.00 MB");
    }
}
