//! Offline embedding provider based on character-trigram feature hashing.
//!
//! Vectors are deterministic and unit-length, so squared Euclidean distances
//! fall in `[0, 2]` for non-negative features the same way they do for a
//! normalized sentence-transformer model. Lexical overlap is all it captures.

use crate::{EmbedResponse, EmbeddingProvider, ProviderError};

/// Tokens shorter than this carry almost no signal ("is", "to", "9").
const MIN_TOKEN_CHARS: usize = 3;

#[derive(Debug, Clone)]
pub struct HashingProvider {
    dimensions: usize,
    name: String,
}

impl HashingProvider {
    pub fn new(dimensions: usize) -> Self {
        let dimensions = dimensions.max(1);
        Self {
            dimensions,
            name: format!("hashing-trigram-{}", dimensions),
        }
    }

    /// Short words only count when nothing else does: a text with no token
    /// of `MIN_TOKEN_CHARS` is hashed as one run of its words instead.
    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];
        let mut counted = 0usize;
        for token in tokens(text) {
            counted += self.add_trigrams(&mut vector, &token);
        }
        if counted == 0 {
            let words: Vec<String> = words(text).map(|w| w.to_lowercase()).collect();
            if !words.is_empty() {
                self.add_trigrams(&mut vector, &words.join(" "));
            }
        }
        normalize(&mut vector);
        vector
    }

    fn add_trigrams(&self, vector: &mut [f32], token: &str) -> usize {
        let padded: Vec<char> = std::iter::once('#')
            .chain(token.chars())
            .chain(std::iter::once('#'))
            .collect();
        let mut added = 0;
        for gram in padded.windows(3) {
            let gram: String = gram.iter().collect();
            vector[self.bucket(&gram)] += 1.0;
            added += 1;
        }
        added
    }

    fn bucket(&self, gram: &str) -> usize {
        let hash = blake3::hash(gram.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(head) % self.dimensions as u64) as usize
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashingProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        Ok(EmbedResponse {
            vectors: texts.iter().map(|t| self.embed_one(t)).collect(),
        })
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    words(text)
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(|t| t.to_lowercase())
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[test]
    fn vectors_are_unit_length() {
        let p = HashingProvider::new(256);
        let v = p.embed_one("Clause 9.1 Exclusions apply to flood damage.");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn same_text_embeds_identically() {
        let p = HashingProvider::new(128);
        assert_eq!(p.embed_one("flood damage"), p.embed_one("Flood  DAMAGE"));
    }

    #[test]
    fn punctuation_only_is_zero_vector() {
        let p = HashingProvider::new(32);
        assert!(p.embed_one("?! -- ...").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn short_words_still_embed() {
        let p = HashingProvider::new(256);
        for text in ["is it ok?", "do I go to NY?", "a"] {
            let v = p.embed_one(text);
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "{} did not embed", text);
        }
    }

    #[test]
    fn short_word_question_is_far_from_unrelated_clause() {
        let p = HashingProvider::new(1024);
        let doc = p.embed_one("Clause 9.1 Exclusions apply to flood damage.");
        let question = p.embed_one("is it ok?");
        assert!(squared_l2(&doc, &question) > 1.1);
    }

    #[test]
    fn related_text_is_closer_than_unrelated_text() {
        let p = HashingProvider::new(1024);
        let doc = p.embed_one("Clause 9.1 Exclusions apply to flood damage.");
        let related = p.embed_one("what is excluded for flood damage?");
        let unrelated = p.embed_one("Who painted the ceiling of the Sistine Chapel?");
        assert!(squared_l2(&doc, &related) < squared_l2(&doc, &unrelated));
    }

    #[tokio::test]
    async fn embed_returns_one_vector_per_input() {
        let p = HashingProvider::new(16);
        let resp = p
            .embed(&["one".to_string(), "two".to_string(), "three".to_string()])
            .await
            .unwrap();
        assert_eq!(resp.vectors.len(), 3);
        assert!(resp.vectors.iter().all(|v| v.len() == 16));
    }
}
