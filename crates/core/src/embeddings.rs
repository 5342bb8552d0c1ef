use providers::{EmbeddingProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub vectors: Vec<Vec<f32>>,
}

/// Embeds one request and checks the provider answered every input.
pub async fn embed(
    req: EmbeddingRequest,
    provider: &dyn EmbeddingProvider,
) -> Result<EmbeddingResult, ProviderError> {
    let resp = provider.embed(&req.texts).await?;
    if resp.vectors.len() != req.texts.len() {
        return Err(ProviderError::CountMismatch {
            expected: req.texts.len(),
            got: resp.vectors.len(),
        });
    }
    Ok(EmbeddingResult {
        vectors: resp.vectors,
    })
}

/// Embeds a single query string.
pub async fn embed_query(
    query: &str,
    provider: &dyn EmbeddingProvider,
) -> Result<Vec<f32>, ProviderError> {
    let result = embed(
        EmbeddingRequest {
            texts: vec![query.to_string()],
        },
        provider,
    )
    .await?;
    Ok(result.vectors.into_iter().next().unwrap_or_default())
}
