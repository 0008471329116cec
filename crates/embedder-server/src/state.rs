use anyhow::Result;
use embedder::embedding;
use embedder::embedding::EmbeddingProvider;
use embedder::services::{EmbedService, ModelConfig};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub embed_service: Arc<EmbedService>,
}

impl AppState {
    /// Load the configured model. Returns only once it is ready to serve.
    pub async fn load(config: &ModelConfig) -> Result<Self> {
        tracing::info!("Loading model {} via {} provider", config.name, config.provider);
        let embedding = embedding::create_provider(config).await?;
        tracing::info!(
            "Model loaded: {} ({} dimensions)",
            embedding.model_id(),
            embedding.dimensions()
        );

        Ok(Self::new(embedding))
    }

    pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embed_service: Arc::new(EmbedService::new(embedding)),
        }
    }
}
