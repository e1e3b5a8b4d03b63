//! Sliding-window text splitter.
//!
//! Windows are measured in characters, not bytes, so accented French text
//! splits at the same positions regardless of encoding width. Chunk content
//! is stored trimmed but offsets always describe the untrimmed window, so
//! the original span can be recovered from the full text.

use crate::config::RagConfig;
use crate::{Error, Result};

/// A chunk produced by the splitter.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// Zero-based index among the kept chunks.
    pub chunk_index: u32,
    /// Trimmed window content.
    pub content: String,
    /// Character offset where the window starts.
    pub char_start: usize,
    /// Character offset one past the end of the window.
    pub char_end: usize,
}

/// Splits text into fixed-size overlapping character windows.
#[derive(Debug, Clone)]
pub struct Splitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Splitter {
    /// Creates a splitter.
    ///
    /// Fails when `chunk_overlap` is not strictly smaller than `chunk_size`,
    /// which would prevent the window from ever advancing.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Creates a splitter from pipeline configuration.
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Returns the window size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the overlap between consecutive windows in characters.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into overlapping windows.
    ///
    /// Windows whose content trims to nothing are dropped; the remaining
    /// chunks are re-indexed contiguously.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return vec![];
        }

        // Text fitting in one window is a single full-span chunk; the
        // window never slides.
        if chars.len() <= self.chunk_size {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return vec![];
            }
            return vec![TextChunk {
                chunk_index: 0,
                content: trimmed.to_string(),
                char_start: 0,
                char_end: chars.len(),
            }];
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            let trimmed = window.trim();

            if !trimmed.is_empty() {
                chunks.push(TextChunk {
                    chunk_index: chunks.len() as u32,
                    content: trimmed.to_string(),
                    char_start: start,
                    char_end: end,
                });
            }

            start += step;
            if start >= chars.len() {
                break;
            }
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_chunk_size() {
        assert!(Splitter::new(100, 100).is_err());
        assert!(Splitter::new(100, 150).is_err());
        assert!(Splitter::new(0, 0).is_err());
        assert!(Splitter::new(100, 99).is_ok());
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        let splitter = Splitter::new(500, 100).unwrap();
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\t  ").is_empty());
    }

    #[test]
    fn short_text_produces_a_single_full_span_chunk() {
        let splitter = Splitter::new(500, 100).unwrap();
        let chunks = splitter.split("Présentation du groupement.");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[0].char_end, "Présentation du groupement.".chars().count());

        // Exactly one window wide still means one chunk.
        let chunks = splitter.split(&"x".repeat(500));
        assert_eq!(chunks.len(), 1);
        assert_eq!((chunks[0].char_start, chunks[0].char_end), (0, 500));
    }

    #[test]
    fn windows_advance_by_chunk_size_minus_overlap() {
        let text: String = (0..1200).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let splitter = Splitter::new(500, 100).unwrap();
        let chunks = splitter.split(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!((chunks[0].char_start, chunks[0].char_end), (0, 500));
        assert_eq!((chunks[1].char_start, chunks[1].char_end), (400, 900));
        assert_eq!((chunks[2].char_start, chunks[2].char_end), (800, 1200));

        // Consecutive windows share the overlap region.
        assert!(chunks[0].content.ends_with(&chunks[1].content[..100]));
    }

    #[test]
    fn trailing_partial_window_is_emitted() {
        // 900 chars with step 400 leaves a short tail window [800, 900).
        let text: String = "m".repeat(900);
        let splitter = Splitter::new(500, 100).unwrap();
        let chunks = splitter.split(&text);

        let spans: Vec<(usize, usize)> = chunks
            .iter()
            .map(|chunk| (chunk.char_start, chunk.char_end))
            .collect();
        assert_eq!(spans, vec![(0, 500), (400, 900), (800, 900)]);
        assert_eq!(chunks[2].content.chars().count(), 100);
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        // 10 two-byte characters.
        let text = "é".repeat(10);
        let splitter = Splitter::new(4, 1).unwrap();
        let chunks = splitter.split(&text);

        assert_eq!((chunks[0].char_start, chunks[0].char_end), (0, 4));
        assert_eq!(chunks[0].content, "éééé");
        assert_eq!((chunks[1].char_start, chunks[1].char_end), (3, 7));
    }

    #[test]
    fn content_is_trimmed_but_offsets_are_not() {
        let text = format!("{}   debut du texte", " ".repeat(3));
        let splitter = Splitter::new(12, 2).unwrap();
        let chunks = splitter.split(&text);

        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[0].char_end, 12);
        assert!(!chunks[0].content.starts_with(' '));
    }

    #[test]
    fn whitespace_only_windows_are_dropped_and_reindexed() {
        let text = format!("abcd{}wxyz", " ".repeat(8));
        let splitter = Splitter::new(4, 0).unwrap();
        let chunks = splitter.split(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "abcd");
        assert_eq!(chunks[1].content, "wxyz");
        assert_eq!(chunks[1].chunk_index, 1);
        assert_eq!(chunks[1].char_start, 12);
    }

    #[test]
    fn full_text_is_covered_by_chunk_spans() {
        let text: String = "x".repeat(2750);
        let splitter = Splitter::new(500, 100).unwrap();
        let chunks = splitter.split(&text);

        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks.last().unwrap().char_end, 2750);
        for pair in chunks.windows(2) {
            assert!(pair[1].char_start <= pair[0].char_end);
        }
    }
}
