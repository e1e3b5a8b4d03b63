//! DOCX text extraction.
//!
//! A DOCX file is a zip archive; paragraphs and their styles live in
//! `word/document.xml` and document properties in `docProps/core.xml`.
//! The WordprocessingML subset needed here (paragraphs, runs, paragraph
//! styles) is scanned directly rather than going through a full XML parser.

use std::io::Read;
use std::path::Path;

use crate::document::{ParsedSection, SourceMetadata};
use crate::error::{ExtractError, ExtractResult};

/// A paragraph with its resolved style id (e.g. `Heading1`).
#[derive(Debug, Clone)]
pub(crate) struct DocxParagraph {
    pub style: Option<String>,
    pub text: String,
}

impl DocxParagraph {
    /// Paragraphs styled `Heading*` open a new section.
    pub fn is_heading(&self) -> bool {
        self.style
            .as_deref()
            .is_some_and(|style| style.starts_with("Heading"))
    }
}

pub(crate) struct DocxContent {
    pub sections: Vec<ParsedSection>,
    pub paragraph_count: u32,
    pub metadata: SourceMetadata,
}

pub(crate) fn extract_docx(path: &Path) -> ExtractResult<DocxContent> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ExtractError::parse(format!("invalid docx archive: {e}")))?;

    let document_xml = read_archive_entry(&mut archive, "word/document.xml")?
        .ok_or_else(|| ExtractError::parse("no word/document.xml in archive"))?;
    let core_xml = read_archive_entry(&mut archive, "docProps/core.xml")?;

    let paragraphs = parse_paragraphs(&document_xml);
    let paragraph_count = paragraphs.len() as u32;
    let sections = build_sections(&paragraphs);

    let metadata = core_xml
        .as_deref()
        .map(core_properties)
        .unwrap_or_default();

    Ok(DocxContent {
        sections,
        paragraph_count,
        metadata,
    })
}

fn read_archive_entry(
    archive: &mut zip::ZipArchive<std::fs::File>,
    name: &str,
) -> ExtractResult<Option<String>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ExtractError::parse(format!("cannot open {name}: {e}"))),
    };

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| ExtractError::parse(format!("cannot read {name}: {e}")))?;
    Ok(Some(content))
}

/// Groups paragraphs into sections.
///
/// A heading paragraph closes the current section (pushed when it holds
/// non-whitespace content) and opens a new one titled with the heading text.
/// Other paragraphs are appended newline-joined. When no headings exist at
/// all, everything collapses into one "Document" section.
pub(crate) fn build_sections(paragraphs: &[DocxParagraph]) -> Vec<ParsedSection> {
    let mut sections = Vec::new();
    let mut order: u32 = 0;
    let mut title = Some("Introduction".to_string());
    let mut content = String::new();

    for para in paragraphs {
        if para.is_heading() {
            if !content.trim().is_empty() {
                sections.push(ParsedSection {
                    title: title.take(),
                    content: std::mem::take(&mut content),
                    page: None,
                    order,
                });
                order += 1;
            } else {
                content.clear();
            }
            title = Some(para.text.clone());
        } else if !para.text.trim().is_empty() {
            content.push_str(&para.text);
            content.push('\n');
        }
    }

    if !content.trim().is_empty() {
        sections.push(ParsedSection {
            title,
            content,
            page: None,
            order,
        });
    }

    if sections.is_empty() {
        let all_text: Vec<&str> = paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect();
        sections.push(ParsedSection {
            title: Some("Document".to_string()),
            content: all_text.join("\n"),
            page: None,
            order: 0,
        });
    }

    sections
}

/// Scans `word/document.xml` for paragraphs, run text, and paragraph styles.
pub(crate) fn parse_paragraphs(xml: &str) -> Vec<DocxParagraph> {
    let mut paragraphs = Vec::new();
    let mut style: Option<String> = None;
    let mut text = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    let mut chars = xml.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '<' {
            if in_text {
                text.push(c);
            }
            continue;
        }

        let mut tag = String::new();
        for tc in chars.by_ref() {
            if tc == '>' {
                break;
            }
            tag.push(tc);
        }
        let name = tag_name(&tag);
        let self_closing = tag.ends_with('/');

        match name {
            "w:p" if !tag.starts_with('/') => {
                in_paragraph = true;
                style = None;
                text.clear();
            }
            "/w:p" => {
                if in_paragraph {
                    paragraphs.push(DocxParagraph {
                        style: style.take(),
                        text: unescape_xml(&text),
                    });
                }
                in_paragraph = false;
            }
            "w:pStyle" if in_paragraph => {
                style = attribute_value(&tag, "w:val");
            }
            "w:t" if !self_closing && !tag.starts_with('/') => {
                in_text = true;
            }
            "/w:t" => {
                in_text = false;
            }
            // Tabs and line breaks inside a run become whitespace.
            "w:tab" if in_paragraph => text.push(' '),
            "w:br" if in_paragraph => text.push('\n'),
            _ => {}
        }
    }

    paragraphs
}

/// Tag name without attributes or the self-closing slash.
fn tag_name(tag: &str) -> &str {
    let end = tag
        .find(|c: char| c.is_whitespace())
        .unwrap_or_else(|| tag.trim_end_matches('/').len());
    &tag[..end]
}

fn attribute_value(tag: &str, attr: &str) -> Option<String> {
    let marker = format!("{attr}=\"");
    let start = tag.find(&marker)? + marker.len();
    let end = tag[start..].find('"')? + start;
    Some(unescape_xml(&tag[start..end]))
}

fn unescape_xml(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

/// Pulls author/title/subject and created/modified timestamps from
/// `docProps/core.xml`.
fn core_properties(xml: &str) -> SourceMetadata {
    SourceMetadata {
        author: element_text(xml, "dc:creator"),
        title: element_text(xml, "dc:title"),
        subject: element_text(xml, "dc:subject"),
        created: element_text(xml, "dcterms:created"),
        modified: element_text(xml, "dcterms:modified"),
        ..SourceMetadata::default()
    }
}

fn element_text(xml: &str, element: &str) -> Option<String> {
    let open = format!("<{element}");
    let close = format!("</{element}>");

    let start_tag = xml.find(&open)?;
    let content_start = xml[start_tag..].find('>')? + start_tag + 1;
    let content_end = xml[content_start..].find(&close)? + content_start;

    let value = unescape_xml(xml[content_start..content_end].trim());
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(style: Option<&str>, text: &str) -> DocxParagraph {
        DocxParagraph {
            style: style.map(String::from),
            text: text.to_string(),
        }
    }

    #[test]
    fn headings_open_new_sections() {
        let paragraphs = [
            para(Some("Heading1"), "Présentation"),
            para(None, "Texte de présentation."),
            para(None, "Suite du texte."),
            para(Some("Heading2"), "Moyens humains"),
            para(None, "Description des équipes."),
        ];

        let sections = build_sections(&paragraphs);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title.as_deref(), Some("Présentation"));
        assert_eq!(
            sections[0].content,
            "Texte de présentation.\nSuite du texte.\n"
        );
        assert_eq!(sections[0].order, 0);
        assert_eq!(sections[1].title.as_deref(), Some("Moyens humains"));
        assert_eq!(sections[1].order, 1);
    }

    #[test]
    fn leading_body_text_keeps_introduction_title() {
        let paragraphs = [
            para(None, "Préambule sans titre."),
            para(Some("Heading1"), "Chapitre 1"),
            para(None, "Corps du chapitre."),
        ];

        let sections = build_sections(&paragraphs);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title.as_deref(), Some("Introduction"));
        assert_eq!(sections[1].title.as_deref(), Some("Chapitre 1"));
    }

    #[test]
    fn no_headings_yields_one_introduction_section() {
        let paragraphs = [
            para(None, "Premier paragraphe."),
            para(None, "   "),
            para(None, "Second paragraphe."),
        ];

        let sections = build_sections(&paragraphs);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("Introduction"));
        assert_eq!(
            sections[0].content,
            "Premier paragraphe.\nSecond paragraphe.\n"
        );
        assert_eq!(sections[0].order, 0);
    }

    #[test]
    fn heading_without_body_falls_back_to_document_section() {
        // Only a trailing heading: no section gets pushed, so the fallback
        // collapses everything into one "Document" section.
        let paragraphs = [para(Some("Heading1"), "Titre seul")];

        let sections = build_sections(&paragraphs);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("Document"));
        assert_eq!(sections[0].content, "Titre seul");
        assert_eq!(sections[0].order, 0);
    }

    #[test]
    fn empty_heading_sections_are_not_pushed() {
        let paragraphs = [
            para(Some("Heading1"), "Titre vide"),
            para(Some("Heading1"), "Titre suivi de texte"),
            para(None, "Contenu."),
        ];

        let sections = build_sections(&paragraphs);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title.as_deref(), Some("Titre suivi de texte"));
    }

    #[test]
    fn parses_paragraph_styles_and_run_text() {
        let xml = r#"<w:document><w:body>
            <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Titre</w:t></w:r></w:p>
            <w:p><w:r><w:t>Premier</w:t></w:r><w:r><w:t xml:space="preserve"> morceau</w:t></w:r></w:p>
            <w:p><w:r><w:t>A &amp; B</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let paragraphs = parse_paragraphs(xml);
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].style.as_deref(), Some("Heading1"));
        assert!(paragraphs[0].is_heading());
        assert_eq!(paragraphs[0].text, "Titre");
        assert_eq!(paragraphs[1].text, "Premier morceau");
        assert!(!paragraphs[1].is_heading());
        assert_eq!(paragraphs[2].text, "A & B");
    }

    #[test]
    fn core_properties_extraction() {
        let xml = r#"<cp:coreProperties>
            <dc:title>Mémoire technique</dc:title>
            <dc:creator>Bureau d'études</dc:creator>
            <dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T09:00:00Z</dcterms:created>
        </cp:coreProperties>"#;

        let metadata = core_properties(xml);
        assert_eq!(metadata.title.as_deref(), Some("Mémoire technique"));
        assert_eq!(metadata.author.as_deref(), Some("Bureau d'études"));
        assert_eq!(metadata.created.as_deref(), Some("2024-03-01T09:00:00Z"));
        assert!(metadata.subject.is_none());
    }
}
