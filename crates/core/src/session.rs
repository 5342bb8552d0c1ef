//! One user's question-answering session over a set of ingested documents.

use crate::chunker::Chunker;
use crate::config::AppConfig;
use crate::error::SessionError;
use crate::guardrail::{Guardrail, Outcome, Rejection};
use crate::vectorstore::{InMemoryVectorStore, VectorStore};
use crate::{extractor, indexer, search};
use providers::EmbeddingProvider;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub failures: Vec<IngestFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub reason: String,
}

pub struct Session {
    chunker: Chunker,
    guardrail: Guardrail,
    top_k: usize,
    batch_size: usize,
    provider: Arc<dyn EmbeddingProvider>,
    index: Option<InMemoryVectorStore>,
}

impl Session {
    pub fn new(
        config: &AppConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let chunker = Chunker::from_config(&config.chunking)?;
        info!(
            model = provider.model_name(),
            chunk_size = chunker.chunk_size(),
            overlap = chunker.overlap(),
            top_k = config.retrieval.top_k,
            threshold = config.retrieval.guardrail_threshold,
            "session configured"
        );
        Ok(Self {
            chunker,
            guardrail: Guardrail::new(config.retrieval.guardrail_threshold),
            top_k: config.retrieval.top_k,
            batch_size: config.embeddings.batch_size,
            provider,
            index: None,
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    pub fn indexed_chunks(&self) -> usize {
        self.index.as_ref().map(|i| i.len()).unwrap_or(0)
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Loads, chunks and indexes `paths`, replacing whatever was indexed
    /// before. Documents that fail to load are reported, not fatal. When no
    /// chunk survives the session ends up unloaded.
    ///
    /// An embedding or index error aborts the call and keeps the previous
    /// index.
    pub async fn ingest(&mut self, paths: &[PathBuf]) -> Result<IngestReport, SessionError> {
        let mut report = IngestReport::default();
        let mut chunks = Vec::new();

        for path in paths {
            match extractor::load_document(path) {
                Ok(doc) => {
                    let doc_chunks = self.chunker.chunk_document(&doc);
                    info!(
                        document = %doc.name,
                        pages = doc.pages.len(),
                        chunks = doc_chunks.len(),
                        "document loaded"
                    );
                    report.documents += 1;
                    chunks.extend(doc_chunks);
                }
                Err(e) => {
                    warn!(path = %e.path().display(), error = %e, "skipping document");
                    report.failures.push(IngestFailure {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if chunks.is_empty() {
            warn!("no text indexed; session is unloaded");
            self.index = None;
            return Ok(report);
        }

        report.chunks = chunks.len();
        let index = indexer::build_index(chunks, self.provider.as_ref(), self.batch_size).await?;
        self.index = Some(index);
        Ok(report)
    }

    /// Answers `question` from the current index.
    pub async fn ask(&self, question: &str) -> Result<Outcome, SessionError> {
        let Some(index) = &self.index else {
            return Ok(Outcome::not_loaded());
        };
        let question = question.trim();
        if !question.chars().any(char::is_alphanumeric) {
            return Ok(Outcome::Rejected(Rejection::irrelevant(None)));
        }
        let hits = search::vector_search(index, self.provider.as_ref(), question, self.top_k).await?;
        let outcome = self.guardrail.evaluate(&hits);
        info!(
            answered = outcome.is_answered(),
            best = hits.first().map(|h| h.distance),
            threshold = self.guardrail.threshold(),
            "question evaluated"
        );
        Ok(outcome)
    }
}
