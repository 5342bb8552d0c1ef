use crate::embeddings;
use crate::error::SessionError;
use crate::models::Chunk;
use crate::vectorstore::{InMemoryVectorStore, VectorRecord, VectorStore};
use providers::EmbeddingProvider;
use tracing::info;

/// Embeds `chunks` batch by batch and loads them into a fresh index.
pub async fn build_index(
    chunks: Vec<Chunk>,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<InMemoryVectorStore, SessionError> {
    let mut store = InMemoryVectorStore::new();
    let mut embedded = 0usize;
    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embedded_batch =
            embeddings::embed(embeddings::EmbeddingRequest { texts }, provider).await?;
        let records = batch
            .iter()
            .zip(embedded_batch.vectors)
            .map(|(chunk, vector)| VectorRecord {
                id: chunk.id.clone(),
                vector,
                chunk: chunk.clone(),
            })
            .collect();
        store.upsert(records).await?;
        embedded += batch.len();
    }
    info!(
        chunks = embedded,
        model = provider.model_name(),
        "index built"
    );
    Ok(store)
}
