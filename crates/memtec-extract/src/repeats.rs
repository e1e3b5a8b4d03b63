//! Repeated header/footer elimination.
//!
//! Running headers and footers survive page-by-page extraction as lines
//! repeated verbatim throughout the document. Body paragraphs rarely repeat
//! exactly, so an occurrence count is enough to flag them.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Default minimum length of a candidate repeated line.
pub const DEFAULT_MIN_LEN: usize = 10;

/// Default maximum length of a candidate repeated line.
pub const DEFAULT_MAX_LEN: usize = 100;

/// Default occurrence count at which a line is flagged as an artifact.
pub const DEFAULT_MIN_OCCURRENCES: usize = 3;

/// Strategy for detecting repeated line artifacts in extracted text.
///
/// Kept behind a trait so positional or per-page-frequency detectors can be
/// substituted without touching the extractor.
pub trait RepeatDetector: Send + Sync {
    /// Returns the set of trimmed lines considered repeated artifacts.
    fn detect_repeats(&self, text: &str) -> HashSet<String>;
}

/// Count-based repeat detector.
///
/// Flags any trimmed line whose length is within `[min_len, max_len]` and
/// which occurs at least `min_occurrences` times.
#[derive(Debug, Clone)]
pub struct FrequencyRepeatDetector {
    min_len: usize,
    max_len: usize,
    min_occurrences: usize,
}

impl Default for FrequencyRepeatDetector {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
        }
    }
}

impl FrequencyRepeatDetector {
    /// Creates a detector with custom length bounds.
    pub fn new(min_len: usize, max_len: usize, min_occurrences: usize) -> Self {
        Self {
            min_len,
            max_len,
            min_occurrences,
        }
    }
}

impl RepeatDetector for FrequencyRepeatDetector {
    fn detect_repeats(&self, text: &str) -> HashSet<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for line in text.lines() {
            let trimmed = line.trim();
            let len = trimmed.chars().count();
            if len >= self.min_len && len <= self.max_len {
                *counts.entry(trimmed).or_default() += 1;
            }
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count >= self.min_occurrences)
            .map(|(line, _)| line.to_string())
            .collect()
    }
}

/// Removes every standalone-line occurrence of the flagged patterns.
///
/// Applied once after normalization, not iteratively. Content embedding a
/// pattern inside a longer line is left untouched.
pub fn remove_repeats(text: &str, patterns: &HashSet<String>) -> String {
    if patterns.is_empty() {
        return text.to_string();
    }

    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !patterns.contains(line.trim()))
        .collect();

    let joined = kept.join("\n");
    let collapsed = NEWLINE_RUN.replace_all(&joined, "\n\n");
    collapsed.trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTER: &str = "Confidentiel - Brouillon v2";

    fn synthetic_document(pages: usize) -> String {
        let mut text = String::new();
        for page in 1..=pages {
            text.push_str(&format!(
                "Contenu de la page {page} avec des détails techniques du chantier.\n"
            ));
            text.push_str(FOOTER);
            text.push_str("\n\n");
        }
        text
    }

    #[test]
    fn detects_footer_repeated_on_every_page() {
        let text = synthetic_document(10);
        let repeats = FrequencyRepeatDetector::default().detect_repeats(&text);
        assert!(repeats.contains(FOOTER));
    }

    #[test]
    fn removes_flagged_footer_as_standalone_line() {
        let text = synthetic_document(10);
        let detector = FrequencyRepeatDetector::default();
        let repeats = detector.detect_repeats(&text);
        let cleaned = remove_repeats(&text, &repeats);

        assert!(!cleaned.lines().any(|line| line.trim() == FOOTER));
        assert!(cleaned.contains("Contenu de la page 1"));
        assert!(cleaned.contains("Contenu de la page 10"));
    }

    #[test]
    fn below_threshold_lines_are_kept() {
        let text = "En-tête possible du document\n\ncorps\n\nEn-tête possible du document";
        let repeats = FrequencyRepeatDetector::default().detect_repeats(text);
        assert!(repeats.is_empty());
        assert_eq!(remove_repeats(text, &repeats), text);
    }

    #[test]
    fn length_bounds_exclude_short_and_long_lines() {
        // 6 chars, under the 10-char floor even when repeated.
        let text = "FOO BA\ncorps du texte\nFOO BA\nsuite du texte\nFOO BA";
        let repeats = FrequencyRepeatDetector::default().detect_repeats(text);
        assert!(repeats.is_empty());

        let long_line = "x".repeat(150);
        let text = format!("{long_line}\ncorps\n{long_line}\nsuite\n{long_line}");
        let repeats = FrequencyRepeatDetector::default().detect_repeats(&text);
        assert!(repeats.is_empty());
    }

    #[test]
    fn inline_occurrences_survive_removal() {
        let detector = FrequencyRepeatDetector::default();
        let text = format!(
            "{FOOTER}\nune phrase citant {FOOTER} au milieu\n{FOOTER}\nautre phrase\n{FOOTER}"
        );
        let repeats = detector.detect_repeats(&text);
        assert!(repeats.contains(FOOTER));

        let cleaned = remove_repeats(&text, &repeats);
        assert!(cleaned.contains(&format!("citant {FOOTER} au milieu")));
        assert!(!cleaned.lines().any(|line| line.trim() == FOOTER));
    }
}
