//! Boundary-aware passage splitting.
//!
//! Pages are cut into passages of at most `chunk_size` characters. Inside
//! that budget a cut is placed at the furthest boundary of the highest
//! available priority:
//!
//! 1. the start of a line opening with `Section` or `Clause`
//! 2. a paragraph break
//! 3. a line break
//! 4. a space
//!
//! and only when none of those exist, at an arbitrary character. Each passage
//! after the first repeats up to `chunk_overlap` characters of its
//! predecessor, starting on a word boundary where possible. Passages are
//! exact slices of the page, so dropping the overlap and concatenating them
//! gives the page back.
//!
//! All sizes are counted in characters, not bytes.

use crate::config::{ChunkingConfig, ConfigError};
use crate::models::{Chunk, Document};
use crate::tagger;

#[derive(Debug, Clone, Copy)]
enum Boundary {
    /// Pattern starts with `\n`; the cut goes right after that newline so the
    /// labeled unit opens the next passage.
    LineStart(&'static str),
    /// Cut right after the separator.
    After(&'static str),
}

impl Boundary {
    fn pattern(self) -> &'static str {
        match self {
            Boundary::LineStart(p) | Boundary::After(p) => p,
        }
    }

    /// Byte distance from the start of a match to the cut.
    fn cut_offset(self) -> usize {
        match self {
            Boundary::LineStart(_) => 1,
            Boundary::After(p) => p.len(),
        }
    }
}

const BOUNDARIES: [Boundary; 5] = [
    Boundary::LineStart("\nSection"),
    Boundary::LineStart("\nClause"),
    Boundary::After("\n\n"),
    Boundary::After("\n"),
    Boundary::After(" "),
];

/// A slice of the input text with its character offsets (end exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passage<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if overlap >= chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                size: chunk_size,
                overlap,
            });
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn from_config(cfg: &ChunkingConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.chunk_size, cfg.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Splits `text` into passages. Whitespace-only passages are dropped.
    pub fn split<'a>(&self, text: &'a str) -> Vec<Passage<'a>> {
        let chars: Vec<char> = text.chars().collect();
        // bounds[i] is the byte offset of character i; bounds[len] == text.len()
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = chars.len();

        let mut passages = Vec::new();
        let mut pos = 0;
        while pos < total {
            let (cut, last) = if total - pos <= self.chunk_size {
                (total, true)
            } else {
                let max_cut = pos + self.chunk_size;
                let min_cut = pos + self.overlap + 1;
                (self.find_cut(text, &bounds, pos, min_cut, max_cut), false)
            };

            let slice = &text[bounds[pos]..bounds[cut]];
            if !slice.trim().is_empty() {
                passages.push(Passage {
                    start: pos,
                    end: cut,
                    text: slice,
                });
            }
            if last {
                break;
            }
            pos = self.next_start(&chars, cut);
        }
        passages
    }

    /// Furthest cut in `[min_cut, max_cut]` at the best boundary available.
    fn find_cut(
        &self,
        text: &str,
        bounds: &[usize],
        pos: usize,
        min_cut: usize,
        max_cut: usize,
    ) -> usize {
        let lo = bounds[min_cut];
        let hi = bounds[max_cut];
        let region_start = bounds[pos];
        for boundary in BOUNDARIES {
            let pattern = boundary.pattern();
            let offset = boundary.cut_offset();
            // a `\nSection` match may run past the budget; only its cut must fit
            let mut region_end = (hi.saturating_sub(offset) + pattern.len()).min(text.len());
            while !text.is_char_boundary(region_end) {
                region_end += 1;
            }
            if region_end <= region_start {
                continue;
            }
            let best = text[region_start..region_end]
                .match_indices(pattern)
                .map(|(i, _)| region_start + i + offset)
                .filter(|cut| *cut >= lo && *cut <= hi)
                .last();
            if let Some(byte) = best {
                if let Ok(idx) = bounds.binary_search(&byte) {
                    return idx;
                }
            }
        }
        max_cut
    }

    /// Where the passage after a cut at `cut` begins: the first word start at
    /// or after `cut - overlap`, the raw offset when the overlap is mid-word.
    fn next_start(&self, chars: &[char], cut: usize) -> usize {
        let raw = cut - self.overlap;
        (raw..=cut)
            .find(|&j| j > 0 && chars[j - 1].is_whitespace() && !chars[j].is_whitespace())
            .unwrap_or(raw)
    }

    /// Chunks every page of `doc` and tags each passage with its section.
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in &doc.pages {
            for passage in self.split(&page.text) {
                let ordinal = chunks.len();
                chunks.push(Chunk {
                    id: chunk_id(&doc.name, page.number, ordinal, passage.text),
                    text: passage.text.to_string(),
                    doc_name: doc.name.clone(),
                    page: page.number,
                    section: tagger::detect_section(passage.text),
                    ordinal,
                    start: passage.start,
                    end: passage.end,
                });
            }
        }
        chunks
    }
}

fn chunk_id(doc_name: &str, page: usize, ordinal: usize, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(doc_name.as_bytes());
    hasher.update(&(page as u64).to_le_bytes());
    hasher.update(&(ordinal as u64).to_le_bytes());
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Page, GENERAL_REFERENCE};
    use std::path::PathBuf;

    /// Concatenates passages, dropping the part each one shares with its
    /// predecessor.
    fn reassemble(passages: &[Passage<'_>]) -> String {
        let mut out = String::new();
        let mut covered = 0;
        for p in passages {
            assert!(p.start <= covered, "gap before passage at {}", p.start);
            out.extend(p.text.chars().skip(covered - p.start));
            covered = p.end;
        }
        out
    }

    fn policy_text() -> String {
        let mut text = String::new();
        for n in 1..=6 {
            text.push_str(&format!("Section {}. Coverage terms\n", n));
            for c in 1..=3 {
                text.push_str(&format!(
                    "Clause {}.{} The insurer will pay for loss or damage caused by \
                     storm, fire or escape of water, subject to the excess shown in \
                     the schedule and the conditions of this policy.\n\n",
                    n, c
                ));
            }
        }
        text
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(Chunker::new(0, 0), Err(ConfigError::ZeroChunkSize)));
        assert!(matches!(
            Chunker::new(100, 100),
            Err(ConfigError::OverlapTooLarge { .. })
        ));
    }

    #[test]
    fn empty_and_blank_text_yield_nothing() {
        let chunker = Chunker::new(700, 100).unwrap();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n\n  ").is_empty());
    }

    #[test]
    fn short_text_is_a_single_passage() {
        let chunker = Chunker::new(700, 100).unwrap();
        let text = "Clause 9.1 Exclusions apply to flood damage.";
        let passages = chunker.split(text);
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, text);
        assert_eq!((passages[0].start, passages[0].end), (0, text.chars().count()));
    }

    #[test]
    fn passages_respect_budget_and_reassemble() {
        let chunker = Chunker::new(700, 100).unwrap();
        let text = policy_text();
        let passages = chunker.split(&text);
        assert!(passages.len() > 1);
        for p in &passages {
            assert!(p.text.chars().count() <= 700);
            assert!(!p.text.trim().is_empty());
        }
        assert_eq!(reassemble(&passages), text);
    }

    #[test]
    fn consecutive_passages_overlap_within_limit() {
        let chunker = Chunker::new(300, 60).unwrap();
        let text = policy_text();
        let passages = chunker.split(&text);
        for pair in passages.windows(2) {
            assert!(pair[1].start > pair[0].start);
            assert!(pair[1].start <= pair[0].end);
            assert!(pair[0].end - pair[1].start <= 60);
        }
    }

    #[test]
    fn prefers_cutting_before_a_section_heading() {
        let chunker = Chunker::new(80, 10).unwrap();
        let first = "Section 1 Cover\nWe cover the buildings.\n\nAnd the contents.";
        let text = format!("{}\nSection 2 Exclusions\nWe do not cover wear and tear at all.", first);
        let passages = chunker.split(&text);
        assert_eq!(passages[0].end, first.chars().count() + 1);
        assert!(passages[1].text.contains("Section 2 Exclusions"));
    }

    #[test]
    fn falls_back_to_paragraph_then_space() {
        let chunker = Chunker::new(40, 5).unwrap();
        let text = "alpha beta gamma\n\ndelta epsilon zeta eta theta iota kappa";
        let passages = chunker.split(text);
        assert_eq!(passages[0].text, "alpha beta gamma\n\n");
        for p in &passages[1..] {
            assert!(p.text.chars().count() <= 40);
        }
        assert_eq!(reassemble(&passages), text);
    }

    #[test]
    fn hard_cuts_unbroken_text() {
        let chunker = Chunker::new(10, 2).unwrap();
        let text = "x".repeat(35);
        let passages = chunker.split(&text);
        assert!(passages.iter().all(|p| p.text.chars().count() <= 10));
        assert_eq!(reassemble(&passages), text);
    }

    #[test]
    fn multibyte_text_is_split_on_characters() {
        let chunker = Chunker::new(8, 2).unwrap();
        let text = "§ 3 Überschwemmung 洪水 損害 🌊🌊🌊 Schäden";
        let passages = chunker.split(text);
        assert!(passages.iter().all(|p| p.text.chars().count() <= 8));
        assert_eq!(reassemble(&passages), text);
    }

    #[test]
    fn chunk_document_tags_every_chunk() {
        let chunker = Chunker::new(200, 20).unwrap();
        let doc = Document {
            name: "Policy.pdf".into(),
            path: PathBuf::from("/tmp/Policy.pdf"),
            pages: vec![
                Page {
                    number: 0,
                    text: "Clause 9.1 Exclusions apply to flood damage.".into(),
                },
                Page {
                    number: 1,
                    text: "Premiums are payable monthly in advance.".into(),
                },
            ],
        };
        let chunks = chunker.chunk_document(&doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section, "Clause 9.1");
        assert_eq!(chunks[0].page, 0);
        assert_eq!(chunks[1].section, GENERAL_REFERENCE);
        assert_eq!(chunks[1].page, 1);
        assert_eq!(chunks[1].ordinal, 1);
        assert!(chunks.iter().all(|c| c.doc_name == "Policy.pdf"));
        assert_ne!(chunks[0].id, chunks[1].id);
    }
}
