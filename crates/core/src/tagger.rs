//! Section label detection for chunks.
//!
//! Best effort: the first heading-like reference in the passage wins, even if
//! most of the passage belongs to a different clause.

use crate::models::GENERAL_REFERENCE;
use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Section|Clause|§)\s?\d+(\.\d+)?").expect("section pattern is valid")
});

/// Returns the first `Section N`, `Clause N.N` or `§N` reference in `text`,
/// or [`GENERAL_REFERENCE`].
pub fn detect_section(text: &str) -> String {
    SECTION_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| GENERAL_REFERENCE.to_string())
}
