use crate::config::AppConfig;
#[cfg(feature = "local-embeddings")]
use providers::local::LocalProvider;
use providers::hashing::HashingProvider;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::{EmbeddingProvider, ProviderError, ProviderRegistry};
use std::sync::Arc;
#[cfg(feature = "local-embeddings")]
use tracing::warn;

pub const HASHING: &str = "hashing";
pub const LOCAL: &str = "local";
pub const OPENAI: &str = "openai";

/// Registers every embedding provider available in this build and
/// environment, preferring `embeddings.provider`. The hashing provider is
/// always there; `local` is loaded only when it is the preferred one.
pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new().with_embedding(
        HASHING,
        Arc::new(HashingProvider::new(config.embeddings.dimensions)),
    );

    reg = register_local(reg, config);

    if let (Some(key), Some(base)) = (
        std::env::var_os("OPENAI_API_KEY"),
        std::env::var_os("OPENAI_BASE_URL"),
    ) {
        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: key.to_string_lossy().into_owned(),
            base_url: base.to_string_lossy().into_owned(),
            embedding_model: config.embeddings.model.clone(),
        });
        reg = reg.with_embedding(OPENAI, Arc::new(provider));
    }

    reg.set_preferred_embedding(&config.embeddings.provider)
}

#[cfg(feature = "local-embeddings")]
fn register_local(reg: ProviderRegistry, config: &AppConfig) -> ProviderRegistry {
    // try_new downloads and initialises the model.
    if config.embeddings.provider != LOCAL {
        return reg;
    }
    match LocalProvider::try_new(&config.embeddings.model) {
        Ok(provider) => reg.with_embedding(LOCAL, Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "local embedding model unavailable");
            reg
        }
    }
}

#[cfg(not(feature = "local-embeddings"))]
fn register_local(reg: ProviderRegistry, _config: &AppConfig) -> ProviderRegistry {
    reg
}

/// The provider named by `embeddings.provider`. Fails when that provider
/// was not compiled in, could not be loaded or lacks credentials.
pub fn select_embedding(
    registry: &ProviderRegistry,
) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
    registry.embedding(None).map_err(|e| match e {
        ProviderError::UnknownProvider(name) => ProviderError::Unavailable(name),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_always_registered() {
        let mut config = AppConfig::default();
        config.embeddings.provider = HASHING.to_string();
        config.embeddings.dimensions = 128;
        let reg = build_registry(&config);
        assert!(reg.has_embedding(HASHING));
        let provider = select_embedding(&reg).unwrap();
        assert_eq!(provider.model_name(), "hashing-trigram-128");
    }

    #[test]
    fn default_config_selects_hashing() {
        let reg = build_registry(&AppConfig::default());
        let provider = select_embedding(&reg).unwrap();
        assert_eq!(provider.model_name(), "hashing-trigram-1024");
    }

    #[test]
    fn unregistered_provider_is_an_error() {
        let mut config = AppConfig::default();
        config.embeddings.provider = "does-not-exist".to_string();
        let reg = build_registry(&config);
        match select_embedding(&reg) {
            Err(ProviderError::Unavailable(name)) => assert_eq!(name, "does-not-exist"),
            other => panic!("expected Unavailable, got {:?}", other.map(|p| p.model_name().to_string())),
        }
    }

    #[cfg(not(feature = "local-embeddings"))]
    #[test]
    fn local_needs_the_feature() {
        let mut config = AppConfig::default();
        config.embeddings.provider = LOCAL.to_string();
        let reg = build_registry(&config);
        assert!(matches!(
            select_embedding(&reg),
            Err(ProviderError::Unavailable(_))
        ));
    }
}
