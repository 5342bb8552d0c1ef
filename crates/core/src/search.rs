use crate::embeddings;
use crate::error::SessionError;
use crate::models::ScoredChunk;
use crate::vectorstore::VectorStore;
use providers::EmbeddingProvider;
use tracing::debug;

/// Embeds `question` and returns the `limit` nearest chunks, closest first.
/// A question that embeds to the zero vector matches nothing.
pub async fn vector_search(
    store: &dyn VectorStore,
    provider: &dyn EmbeddingProvider,
    question: &str,
    limit: usize,
) -> Result<Vec<ScoredChunk>, SessionError> {
    let vector = embeddings::embed_query(question, provider).await?;
    if vector.iter().all(|x| *x == 0.0) {
        debug!("question has no embeddable content");
        return Ok(Vec::new());
    }
    let hits = store.search(&vector, limit).await?;
    debug!(
        hits = hits.len(),
        best = hits.first().map(|h| h.distance),
        "vector search"
    );
    Ok(hits)
}
