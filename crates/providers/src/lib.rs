//! Embedding provider abstractions.
//!
//! Every provider maps a batch of texts to fixed-dimension vectors. Callers
//! hold providers behind `Arc<dyn EmbeddingProvider>` and pick one by name
//! through [`ProviderRegistry`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod hashing;
#[cfg(feature = "local")]
pub mod local;
pub mod openai;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("embedding provider `{0}` is not available in this build or environment")]
    Unavailable(String),
    #[error("unsupported embedding model: {0}")]
    UnsupportedModel(String),
    #[error("provider returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub vectors: Vec<Vec<f32>>,
}

#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError>;

    /// Model identifier, reported in logs and JSON output.
    fn model_name(&self) -> &str;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    embeddings: HashMap<String, Arc<dyn EmbeddingProvider>>,
    pub preferred_embedding: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embedding(mut self, name: &str, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embeddings.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred_embedding(mut self, name: &str) -> Self {
        self.preferred_embedding = Some(name.to_string());
        self
    }

    pub fn has_embedding(&self, name: &str) -> bool {
        self.embeddings.contains_key(name)
    }

    pub fn embedding(
        &self,
        name: Option<&str>,
    ) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
        let key = name
            .map(str::to_string)
            .or_else(|| self.preferred_embedding.clone())
            .ok_or_else(|| {
                ProviderError::UnknownProvider("no embedding provider configured".into())
            })?;
        self.embeddings
            .get(&key)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownProvider(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingProvider;

    #[test]
    fn preferred_embedding_is_used_when_no_name_given() {
        let reg = ProviderRegistry::new()
            .with_embedding("hashing", Arc::new(HashingProvider::new(64)))
            .set_preferred_embedding("hashing");
        let provider = reg.embedding(None).unwrap();
        assert_eq!(provider.model_name(), "hashing-trigram-64");
    }

    #[test]
    fn unknown_provider_is_an_error() {
        let reg = ProviderRegistry::new().set_preferred_embedding("openai");
        match reg.embedding(None) {
            Err(ProviderError::UnknownProvider(name)) => assert_eq!(name, "openai"),
            _ => panic!("expected UnknownProvider"),
        }
    }

    #[test]
    fn missing_preference_is_an_error() {
        let reg = ProviderRegistry::new();
        assert!(reg.embedding(None).is_err());
    }
}
