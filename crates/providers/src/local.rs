//! Local sentence-transformer embeddings through `fastembed` (ONNX runtime).
//!
//! Model files are fetched and loaded once in [`LocalProvider::try_new`];
//! that call dominates startup time.

use crate::{EmbedResponse, EmbeddingProvider, ProviderError};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct LocalProvider {
    // `TextEmbedding::embed` needs `&mut self`.
    model: Arc<Mutex<TextEmbedding>>,
    name: String,
}

impl LocalProvider {
    pub fn try_new(model_name: &str) -> Result<Self, ProviderError> {
        let model = resolve_model(model_name)?;
        info!(model = model_name, "loading local embedding model");
        let embedding = TextEmbedding::try_new(
            InitOptions::new(model).with_show_download_progress(false),
        )
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            name: model_name.to_string(),
        })
    }
}

fn resolve_model(name: &str) -> Result<EmbeddingModel, ProviderError> {
    let short = name.rsplit('/').next().unwrap_or(name).to_lowercase();
    match short.as_str() {
        "all-minilm-l6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
        _ => Err(ProviderError::UnsupportedModel(name.to_string())),
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for LocalProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbedResponse, ProviderError> {
        let model = Arc::clone(&self.model);
        let batch = texts.to_vec();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| ProviderError::RequestFailed("embedding model lock poisoned".into()))?;
            guard
                .embed(batch, None)
                .map_err(|e| ProviderError::RequestFailed(e.to_string()))
        })
        .await
        .map_err(|e| ProviderError::RequestFailed(e.to_string()))??;
        Ok(EmbedResponse { vectors })
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_model_names() {
        assert!(matches!(
            resolve_model("all-MiniLM-L6-v2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            resolve_model("sentence-transformers/all-MiniLM-L6-v2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            resolve_model("text-embedding-3-small"),
            Err(ProviderError::UnsupportedModel(_))
        ));
    }
}
