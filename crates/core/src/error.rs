use crate::config::ConfigError;
use crate::vectorstore::IndexError;
use providers::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one input file into a document. Never fatal to a batch.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported format for {path} ({detected})")]
    Unsupported { path: PathBuf, detected: String },
    #[error("cannot parse PDF {path}: {message}")]
    Pdf { path: PathBuf, message: String },
    #[error("no extractable text in {path}")]
    NoText { path: PathBuf },
}

impl IngestError {
    pub fn path(&self) -> &PathBuf {
        match self {
            IngestError::Io { path, .. }
            | IngestError::Unsupported { path, .. }
            | IngestError::Pdf { path, .. }
            | IngestError::NoText { path } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("embedding provider failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("vector index failed: {0}")]
    Index(#[from] IndexError),
}
