//! Text normalization for raw extracted text.

use std::sync::LazyLock;

use regex::Regex;

static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));

static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Standalone page-number artifacts: a bare number, `Page N` / `Page N of M`
/// (case-insensitive keyword), or `N / M`.
static PAGE_ARTIFACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d+|page\s+\d+(?:\s+of\s+\d+)?|\d+\s*/\s*\d+)$").expect("valid regex")
});

/// Cleans raw text extracted from binary document formats.
///
/// Extraction output is noisy: control characters from broken encodings,
/// ragged whitespace, page-number footers, and one-or-two character OCR
/// droppings. Normalization is idempotent, so already-clean text passes
/// through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    /// Creates a new normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalizes raw extracted text.
    ///
    /// - strips control characters except newline and tab
    /// - collapses space/tab runs to a single space
    /// - trims every line
    /// - removes standalone page-number artifact lines
    /// - drops 1-2 character noise lines, preserving blank lines
    /// - collapses 3+ consecutive newlines to exactly 2
    pub fn normalize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let printable: String = raw
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect();

        let mut lines: Vec<String> = Vec::new();

        for line in printable.lines() {
            let collapsed = SPACE_RUN.replace_all(line, " ");
            let trimmed = collapsed.trim();

            if trimmed.is_empty() {
                lines.push(String::new());
                continue;
            }
            if PAGE_ARTIFACT.is_match(trimmed) {
                continue;
            }
            // 1-2 character lines are extraction noise, not content.
            if trimmed.chars().count() <= 2 {
                continue;
            }
            lines.push(trimmed.to_string());
        }

        let joined = lines.join("\n");
        let collapsed = NEWLINE_RUN.replace_all(&joined, "\n\n");

        collapsed.trim_matches('\n').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        TextNormalizer::new().normalize(raw)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\n  "), "");
    }

    #[test]
    fn strips_control_characters_keeps_tabs_and_newlines() {
        let raw = "avant\u{0000}\u{0007}propos\tok\nligne suivante";
        assert_eq!(normalize(raw), "avantpropos ok\nligne suivante");
    }

    #[test]
    fn collapses_space_runs_and_trims_lines() {
        let raw = "  une   phrase \t avec   blancs  \n   autre ligne   ";
        assert_eq!(normalize(raw), "une phrase avec blancs\nautre ligne");
    }

    #[test]
    fn collapses_newline_runs_to_paragraph_boundary() {
        let raw = "premier paragraphe\n\n\n\n\nsecond paragraphe";
        assert_eq!(normalize(raw), "premier paragraphe\n\nsecond paragraphe");
    }

    #[test]
    fn removes_page_number_artifacts() {
        let raw = "contenu principal\n42\nPage 3\npage 7 of 12\n12 / 30\nsuite du texte";
        assert_eq!(normalize(raw), "contenu principal\nsuite du texte");
    }

    #[test]
    fn drops_short_noise_lines_but_keeps_blank_lines() {
        let raw = "paragraphe un\nab\n-\n\nparagraphe deux";
        assert_eq!(normalize(raw), "paragraphe un\n\nparagraphe deux");
    }

    #[test]
    fn idempotent_on_sampled_inputs() {
        let samples = [
            "",
            "texte simple",
            "  espaces   multiples  \n\n\n\nparagraphe\n12\nPage 4 of 9\nxy\nfin du document",
            "ligne\taccentuée é è à\n\nautre § ligne",
            "1 / 2\n\n\nPage 10\ncontenu réel du mémoire",
        ];
        let normalizer = TextNormalizer::new();
        for sample in samples {
            let once = normalizer.normalize(sample);
            let twice = normalizer.normalize(&once);
            assert_eq!(once, twice, "normalize must be idempotent for {sample:?}");
        }
    }
}
