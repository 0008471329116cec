//! Test utilities for the embedder crate
//!
//! Reusable fakes for the `EmbeddingProvider` trait, so the request boundary
//! and the HTTP layer can be tested without downloading a model.

use crate::embedding::EmbeddingProvider;
use anyhow::Result;

/// Test embedding provider that generates deterministic embeddings based on text content.
///
/// Each text is embedded independently, so batch results equal single results.
pub struct TestEmbedding;

impl TestEmbedding {
    pub const DIMENSIONS: usize = 384;
}

#[async_trait::async_trait]
impl EmbeddingProvider for TestEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let hash = text
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        Ok((0..Self::DIMENSIONS)
            .map(|i| ((hash.wrapping_add(i as u32) % 1000) as f32) / 1000.0)
            .collect())
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in &texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    fn model_id(&self) -> &str {
        "test-embedding-model"
    }

    fn dimensions(&self) -> usize {
        Self::DIMENSIONS
    }
}

/// Provider whose every call fails with a fixed message.
pub struct FailingEmbedding {
    message: String,
}

impl FailingEmbedding {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(anyhow::anyhow!("{}", self.message))
    }

    async fn embed_batch(&self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Err(anyhow::anyhow!("{}", self.message))
    }

    fn model_id(&self) -> &str {
        "failing-embedding-model"
    }

    fn dimensions(&self) -> usize {
        TestEmbedding::DIMENSIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedding_is_deterministic() {
        let provider = TestEmbedding;
        let e1 = provider.embed("hello").await.unwrap();
        let e2 = provider.embed("hello").await.unwrap();
        assert_eq!(e1, e2);
    }

    #[tokio::test]
    async fn test_embedding_distinguishes_texts() {
        let provider = TestEmbedding;
        let ab = provider.embed("ab").await.unwrap();
        let ba = provider.embed("ba").await.unwrap();
        assert_ne!(ab, ba);
    }

    #[tokio::test]
    async fn test_embedding_dimensions() {
        let provider = TestEmbedding;
        let embedding = provider.embed("test").await.unwrap();
        assert_eq!(embedding.len(), provider.dimensions());
    }

    #[tokio::test]
    async fn failing_embedding_reports_message() {
        let provider = FailingEmbedding::new("boom");
        let err = provider.embed_batch(vec!["a".to_string()]).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
