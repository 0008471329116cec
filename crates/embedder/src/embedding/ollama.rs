use super::provider::EmbeddingProvider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedding provider
pub struct OllamaEmbedding {
    model_id: String,
    base_url: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl OllamaEmbedding {
    /// Connect to an Ollama server and learn the model's embedding width.
    ///
    /// Ollama does not report dimensions, so one probe text is embedded up
    /// front. Fails if the server is unreachable or the model is missing.
    pub async fn connect(model_id: &str, base_url: &str) -> Result<Self> {
        let mut provider = Self {
            model_id: model_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            dimensions: 0,
            client: reqwest::Client::new(),
        };

        let probe = provider
            .request(&["dimension probe".to_string()])
            .await
            .with_context(|| format!("Failed to probe Ollama model {}", model_id))?;
        provider.dimensions = probe
            .first()
            .map(Vec::len)
            .ok_or_else(|| anyhow::anyhow!("Ollama returned no embedding for probe"))?;

        tracing::info!(
            "Connected to Ollama at {} ({} dimensions)",
            provider.base_url,
            provider.dimensions
        );
        Ok(provider)
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.base_url)
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = OllamaEmbedRequest {
            model: &self.model_id,
            input: texts,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .context("Failed to send Ollama API request")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, text));
        }

        let result: OllamaEmbedResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(result.embeddings)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Ollama returned no embedding"))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(&texts).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
