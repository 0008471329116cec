pub mod local;
pub mod ollama;
pub mod provider;

pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;

use crate::services::ModelConfig;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Create an embedding provider from configuration
pub async fn create_provider(config: &ModelConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider =
                local::LocalEmbedding::new(&config.name, &config.revision, config.max_length)
                    .await
                    .context("Failed to initialize local embedding provider")?;
            Ok(Arc::new(provider))
        },
        "ollama" => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or("http://localhost:11434");
            let provider = ollama::OllamaEmbedding::connect(&config.name, base_url)
                .await
                .context("Failed to initialize Ollama embedding provider")?;
            Ok(Arc::new(provider))
        },
        _ => Err(anyhow::anyhow!("Unknown provider: {}", config.provider)),
    }
}
