use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Section label used when no structural heading is detected in a chunk.
pub const GENERAL_REFERENCE: &str = "General Reference";

#[derive(Debug, Clone)]
pub struct Document {
    /// Display name, the file name without its directory.
    pub name: String,
    pub path: PathBuf,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 0-based; shown to users as `number + 1`.
    pub number: usize,
    pub text: String,
}

/// A passage of one page of one document, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub doc_name: String,
    pub page: usize,
    pub section: String,
    /// Position of the chunk within its document.
    pub ordinal: usize,
    /// Character offsets into the page text, end exclusive.
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    /// `doc_name (section), p.<page+1>`
    pub fn citation(&self) -> String {
        format!("{} ({}), p.{}", self.doc_name, self.section, self.page + 1)
    }

    /// `[section]` followed by the passage on the next line.
    pub fn excerpt(&self) -> String {
        format!("[{}]\n{}", self.section, self.text)
    }
}

/// A chunk returned from the index with its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Lower is more similar.
    pub distance: f32,
}
