use super::types::{EmbedRequest, EmbedResponse, HealthResponse};
use super::ServiceError;
use crate::embedding::EmbeddingProvider;
use std::sync::Arc;

/// Request boundary in front of a loaded embedding model.
///
/// Holds the model handle created at startup; cloning shares it.
#[derive(Clone)]
pub struct EmbedService {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbedService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Validate a raw `POST /embed` body and embed it.
    pub async fn handle(&self, body: &[u8]) -> Result<EmbedResponse, ServiceError> {
        let request = EmbedRequest::parse(body)?;
        self.embed(request).await
    }

    /// Embed every text of the request, all or nothing.
    ///
    /// A provider result with the wrong number of vectors, or a vector of the
    /// wrong width, fails the whole batch.
    pub async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse, ServiceError> {
        let texts = request.texts.into_batch();
        let count = texts.len();
        if count == 0 {
            return Ok(EmbedResponse {
                embeddings: Vec::new(),
            });
        }

        tracing::debug!("Embedding batch of {} texts", count);
        let embeddings = self.provider.embed_batch(texts).await?;

        if embeddings.len() != count {
            return Err(ServiceError::InferenceFailure(format!(
                "model returned {} embeddings for {} texts",
                embeddings.len(),
                count
            )));
        }

        let dimensions = self.provider.dimensions();
        if let Some((index, v)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != dimensions)
        {
            return Err(ServiceError::InferenceFailure(format!(
                "embedding {} has {} dimensions, expected {}",
                index,
                v.len(),
                dimensions
            )));
        }

        Ok(EmbedResponse { embeddings })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            model: self.provider.model_id().to_string(),
            dimensions: self.provider.dimensions(),
        }
    }
}
