//! Relevance guardrail and answer composition.
//!
//! Retrieved passages are returned verbatim as evidence. When the closest one
//! is still too far from the question, nothing is returned at all.

use crate::models::ScoredChunk;
use serde::Serialize;
use std::collections::HashSet;

pub const REJECTION_MESSAGE: &str =
    "I cannot find a definitive answer in the provided policy wording.";
pub const REJECTION_NOTE: &str =
    "Guardrail triggered: Question appears unrelated to policy content.";
pub const NOT_LOADED_MESSAGE: &str = "Please upload documents first.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// No index yet; nothing was queried.
    NotLoaded { message: String },
    Rejected(Rejection),
    Answered(Answer),
}

impl Outcome {
    pub fn not_loaded() -> Self {
        Outcome::NotLoaded {
            message: NOT_LOADED_MESSAGE.to_string(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Outcome::Answered(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub answer: String,
    /// Always empty.
    pub sources: Vec<String>,
    pub note: String,
    pub best_distance: Option<f32>,
}

impl Rejection {
    pub fn irrelevant(best_distance: Option<f32>) -> Self {
        Self {
            answer: REJECTION_MESSAGE.to_string(),
            sources: Vec::new(),
            note: REJECTION_NOTE.to_string(),
            best_distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// Labeled excerpts in rank order, separated by blank lines.
    pub answer: String,
    /// Deduplicated citations. Callers must not rely on their order.
    pub sources: Vec<String>,
    pub best_distance: f32,
    pub excerpts: Vec<Excerpt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Excerpt {
    pub doc_name: String,
    pub section: String,
    /// 1-based, as displayed.
    pub page: usize,
    pub distance: f32,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Guardrail {
    threshold: f32,
}

impl Guardrail {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// A result set passes when it is non-empty and its best distance does
    /// not exceed the threshold. Equal to the threshold passes.
    pub fn passes(&self, results: &[ScoredChunk]) -> bool {
        results
            .first()
            .map(|best| best.distance <= self.threshold)
            .unwrap_or(false)
    }

    /// `results` must be ordered by ascending distance.
    pub fn evaluate(&self, results: &[ScoredChunk]) -> Outcome {
        let best = results.first().map(|r| r.distance);
        if !self.passes(results) {
            return Outcome::Rejected(Rejection::irrelevant(best));
        }
        Outcome::Answered(compose_answer(results))
    }
}

fn compose_answer(results: &[ScoredChunk]) -> Answer {
    let answer = results
        .iter()
        .map(|r| r.chunk.excerpt())
        .collect::<Vec<_>>()
        .join("\n\n");
    let excerpts = results
        .iter()
        .map(|r| Excerpt {
            doc_name: r.chunk.doc_name.clone(),
            section: r.chunk.section.clone(),
            page: r.chunk.page + 1,
            distance: r.distance,
            text: r.chunk.text.clone(),
        })
        .collect();
    Answer {
        answer,
        sources: citations(results),
        best_distance: results.first().map(|r| r.distance).unwrap_or_default(),
        excerpts,
    }
}

/// One citation per distinct `doc (section), p.N`, first occurrence kept.
pub fn citations(results: &[ScoredChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    results
        .iter()
        .map(|r| r.chunk.citation())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
