//! PDF text extraction.
//!
//! Uses `pdf-extract` for page-ordered text (better font encoding handling)
//! with a raw `lopdf` content-stream fallback for malformed files, and
//! `lopdf` for embedded document metadata.

use std::path::Path;

use lopdf::{Document, Object};

use crate::TRACING_TARGET;
use crate::document::{ParsedSection, SourceMetadata};
use crate::error::{ExtractError, ExtractResult};

/// Per-page text plus document metadata and total page count.
pub(crate) struct PdfContent {
    pub sections: Vec<ParsedSection>,
    pub page_count: u32,
    pub metadata: SourceMetadata,
}

pub(crate) fn extract_pdf(path: &Path) -> ExtractResult<PdfContent> {
    let pages = extract_pages(path)?;
    let page_count = pages.len() as u32;

    // Pages producing only whitespace are skipped; `order` keeps the page
    // number, so gaps are expected.
    let sections: Vec<ParsedSection> = pages
        .into_iter()
        .enumerate()
        .filter_map(|(idx, text)| {
            let page = idx as u32 + 1;
            if text.trim().is_empty() {
                return None;
            }
            Some(ParsedSection {
                title: Some(format!("Page {page}")),
                content: text,
                page: Some(page),
                order: page,
            })
        })
        .collect();

    let metadata = match Document::load(path) {
        Ok(doc) => pdf_metadata(&doc),
        Err(e) => {
            tracing::debug!(
                target: TRACING_TARGET,
                error = %e,
                "Could not reload PDF for metadata"
            );
            SourceMetadata::default()
        }
    };

    Ok(PdfContent {
        sections,
        page_count,
        metadata,
    })
}

/// Extracts per-page text, falling back to lopdf when pdf-extract fails.
///
/// pdf-extract is known to panic on some malformed files, so the call is
/// wrapped in `catch_unwind`.
fn extract_pages(path: &Path) -> ExtractResult<Vec<String>> {
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_by_pages(path)
    }));

    match outcome {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "pdf-extract failed, trying lopdf fallback"
            );
            extract_pages_via_lopdf(path)
        }
        Err(_) => {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                "pdf-extract panicked, trying lopdf fallback"
            );
            extract_pages_via_lopdf(path)
        }
    }
}

/// Raw content-stream extraction. Less accurate for complex fonts but more
/// tolerant of malformed files.
fn extract_pages_via_lopdf(path: &Path) -> ExtractResult<Vec<String>> {
    let doc = Document::load(path).map_err(ExtractError::parse)?;

    let mut pages = Vec::new();
    for (_page_num, page_id) in doc.get_pages() {
        let mut text = String::new();

        if let Ok(content) = doc.get_page_content(page_id) {
            let operations = lopdf::content::Content::decode(&content)
                .map(|c| c.operations)
                .unwrap_or_default();

            for op in operations {
                match op.operator.as_str() {
                    // Tj: show text string
                    "Tj" => {
                        if let Some(Object::String(bytes, _)) = op.operands.first() {
                            text.push_str(&decode_pdf_string(bytes));
                        }
                    }
                    // TJ: show text array (with kerning)
                    "TJ" => {
                        if let Some(Object::Array(arr)) = op.operands.first() {
                            for item in arr {
                                if let Object::String(bytes, _) = item {
                                    text.push_str(&decode_pdf_string(bytes));
                                }
                            }
                        }
                    }
                    // Text positioning that indicates a new line
                    "Td" | "TD" | "T*" | "'" | "\"" => {
                        if !text.ends_with('\n') && !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                    "ET" => {
                        if !text.ends_with('\n') {
                            text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
        }

        pages.push(text);
    }

    Ok(pages)
}

/// UTF-8 first, Latin-1 fallback.
fn decode_pdf_string(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect())
}

fn pdf_metadata(doc: &Document) -> SourceMetadata {
    let mut metadata = SourceMetadata::default();

    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| obj.as_reference().ok())
        .and_then(|id| doc.get_object(id).ok())
        .and_then(|obj| obj.as_dict().ok());

    if let Some(dict) = info {
        metadata.author = info_string(dict, b"Author");
        metadata.creator = info_string(dict, b"Creator");
        metadata.producer = info_string(dict, b"Producer");
        metadata.subject = info_string(dict, b"Subject");
        metadata.title = info_string(dict, b"Title");
    }

    metadata
}

fn info_string(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|obj| obj.as_str().ok())
        .map(|bytes| decode_pdf_string(bytes))
        .filter(|s| !s.trim().is_empty())
}
