use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,
    #[error("chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    OverlapTooLarge { size: usize, overlap: usize },
    #[error("top_k must be at least 1")]
    ZeroTopK,
    #[error("guardrail_threshold must be a finite, non-negative number")]
    BadThreshold,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    #[serde(default)]
    pub scan: ScanPaths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Best-match distance above which an answer is withheld. Lower distance
    /// means more similar, so raising this admits weaker matches.
    #[serde(default = "default_guardrail_threshold")]
    pub guardrail_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            guardrail_threshold: default_guardrail_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// One of `local`, `openai`, `hashing`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Vector width of the `hashing` provider.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            batch_size: default_batch_size(),
            dimensions: default_dimensions(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanPaths {
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_chunk_size() -> usize {
    700
}

fn default_chunk_overlap() -> usize {
    100
}

fn default_top_k() -> usize {
    3
}

fn default_guardrail_threshold() -> f32 {
    1.1
}

fn default_provider() -> String {
    "hashing".to_string()
}

fn default_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_dimensions() -> usize {
    1024
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                size: c.chunk_size,
                overlap: c.chunk_overlap,
            });
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        let t = self.retrieval.guardrail_threshold;
        if !t.is_finite() || t < 0.0 {
            return Err(ConfigError::BadThreshold);
        }
        Ok(())
    }
}

/// Loads `path` (or `config/default` when present), then applies
/// `POLICY_BOT__SECTION__KEY` environment overrides.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("POLICY_BOT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    let cfg: AppConfig = settings.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}
