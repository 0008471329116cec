use anyhow::Result;

/// A loaded sentence-embedding model.
///
/// Implementations are built once at startup and shared read-only between
/// requests, so every method takes `&self`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate one embedding per text, in input order.
    ///
    /// An empty batch yields an empty result.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the model identifier
    fn model_id(&self) -> &str;

    /// Width of every vector this provider returns
    fn dimensions(&self) -> usize;
}
