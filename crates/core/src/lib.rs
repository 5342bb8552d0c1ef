//! Core library: document loading, chunking, indexing and guarded retrieval.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod guardrail;
pub mod indexer;
pub mod models;
pub mod registry;
pub mod scanner;
pub mod search;
pub mod session;
pub mod tagger;
pub mod vectorstore;

pub use error::{IngestError, SessionError};
pub use guardrail::Outcome;
pub use session::{IngestReport, Session};
