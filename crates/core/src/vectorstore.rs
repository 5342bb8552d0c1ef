use crate::models::{Chunk, ScoredChunk};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector for {id} has {got} dimensions, index expects {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub chunk: Chunk,
}

/// Similarity index over embedded chunks.
///
/// `search` results are ordered by ascending distance: lower means more
/// similar. The guardrail threshold is expressed in the same units, so an
/// implementation with a different metric needs a recalibrated threshold.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<(), IndexError>;
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, IndexError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact nearest-neighbour scan with squared Euclidean distance, the metric
/// Chroma uses by default. For unit vectors it equals `2 - 2·cos`.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: Vec<VectorRecord>,
    positions: HashMap<String, usize>,
    dimensions: Option<usize>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_dimensions(&self, id: &str, got: usize) -> Result<(), IndexError> {
        match self.dimensions {
            Some(expected) if expected != got => Err(IndexError::DimensionMismatch {
                id: id.to_string(),
                expected,
                got,
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<(), IndexError> {
        for record in records {
            self.check_dimensions(&record.id, record.vector.len())?;
            self.dimensions = Some(record.vector.len());
            match self.positions.get(&record.id) {
                Some(&i) => self.records[i] = record,
                None => {
                    self.positions.insert(record.id.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        self.check_dimensions("query", vector.len())?;
        let mut scored: Vec<ScoredChunk> = self
            .records
            .iter()
            .map(|r| ScoredChunk {
                chunk: r.chunk.clone(),
                distance: squared_l2(vector, &r.vector),
            })
            .collect();
        // stable: equal distances keep insertion order
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(limit);
        Ok(scored)
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            vector,
            chunk: Chunk {
                id: id.to_string(),
                text: format!("text {}", id),
                doc_name: "Policy.pdf".into(),
                page: 0,
                section: "Section 1".into(),
                ordinal: 0,
                start: 0,
                end: 6,
            },
        }
    }

    #[tokio::test]
    async fn search_orders_by_ascending_distance() {
        let mut store = InMemoryVectorStore::new();
        store
            .upsert(vec![
                record("far", vec![0.0, 1.0]),
                record("near", vec![1.0, 0.0]),
                record("mid", vec![0.6, 0.8]),
            ])
            .await
            .unwrap();
        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert_eq!(hits[0].distance, 0.0);
        assert!((hits[1].distance - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn upsert_replaces_same_id() {
        let mut store = InMemoryVectorStore::new();
        store.upsert(vec![record("a", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(vec![record("a", vec![0.0, 1.0])]).await.unwrap();
        assert_eq!(store.len(), 1);
        let hits = store.search(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(hits[0].distance, 0.0);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let mut store = InMemoryVectorStore::new();
        store.upsert(vec![record("a", vec![1.0, 0.0])]).await.unwrap();
        assert!(store.upsert(vec![record("b", vec![1.0])]).await.is_err());
        assert!(store.search(&[1.0, 0.0, 0.0], 1).await.is_err());
    }

    #[tokio::test]
    async fn empty_store_returns_no_hits() {
        let store = InMemoryVectorStore::new();
        assert!(store.is_empty());
        assert!(store.search(&[1.0], 3).await.unwrap().is_empty());
    }
}
