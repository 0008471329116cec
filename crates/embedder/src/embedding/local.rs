use super::provider::EmbeddingProvider;
use anyhow::{anyhow, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::sync::Arc;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Local sentence embedding using Candle.
///
/// Runs a BERT encoder in-process followed by attention-masked mean pooling
/// and L2 normalization, matching the sentence-transformers pipeline used by
/// models such as `all-MiniLM-L6-v2`.
pub struct LocalEmbedding {
    model_id: String,
    dimensions: usize,
    encoder: Arc<BertEncoder>,
}

struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl LocalEmbedding {
    /// Download (or reuse the cached copy of) a model from the Hugging Face
    /// hub and load it on the CPU.
    ///
    /// Blocks until the weights are mapped; the caller should not accept
    /// traffic before this returns.
    pub async fn new(model_id: &str, revision: &str, max_length: usize) -> Result<Self> {
        tracing::info!("Initializing local embedding model: {}@{}", model_id, revision);

        let repo_id = model_id.to_string();
        let revision = revision.to_string();
        let (encoder, dimensions) = tokio::task::spawn_blocking(move || {
            BertEncoder::load(&repo_id, &revision, max_length)
        })
        .await
        .context("Model loading task panicked")??;

        Ok(Self {
            model_id: model_id.to_string(),
            dimensions,
            encoder: Arc::new(encoder),
        })
    }
}

impl BertEncoder {
    fn load(model_id: &str, revision: &str, max_length: usize) -> Result<(Self, usize)> {
        let api = Api::new().context("Failed to initialize Hugging Face hub client")?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));

        let config_path = repo
            .get("config.json")
            .with_context(|| format!("Failed to fetch config.json for {}", model_id))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .with_context(|| format!("Failed to fetch tokenizer.json for {}", model_id))?;
        let weights_path = repo
            .get("model.safetensors")
            .with_context(|| format!("Failed to fetch model.safetensors for {}", model_id))?;

        let config: Config = serde_json::from_str(
            &std::fs::read_to_string(&config_path).context("Failed to read model config")?,
        )
        .context("Failed to parse model config")?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let device = Device::Cpu;
        // SAFETY: the safetensors file lives in the hub cache and is not
        // modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)? };
        let model = BertModel::load(vb, &config).context("Failed to load BERT weights")?;

        Ok((
            Self {
                model,
                tokenizer,
                device,
            },
            config.hidden_size,
        ))
    }

    fn encode(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let token_ids = encodings
            .iter()
            .map(|e| Tensor::new(e.get_ids(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;
        let attention_mask = encodings
            .iter()
            .map(|e| Tensor::new(e.get_attention_mask(), &self.device))
            .collect::<candle_core::Result<Vec<_>>>()?;

        let token_ids = Tensor::stack(&token_ids, 0)?;
        let attention_mask = Tensor::stack(&attention_mask, 0)?;
        let token_type_ids = token_ids.zeros_like()?;

        // (batch, seq, hidden)
        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = mean_pool(&hidden, &attention_mask)?;
        let normalized = l2_normalize(&pooled)?;
        Ok(normalized.to_vec2::<f32>()?)
    }
}

/// Average token vectors, ignoring padding positions.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9f32, f32::MAX)?;
    Ok(summed.broadcast_div(&counts)?)
}

fn l2_normalize(v: &Tensor) -> Result<Tensor> {
    let norm = v.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12f32, f32::MAX)?;
    Ok(v.broadcast_div(&norm)?)
}

#[async_trait::async_trait]
impl EmbeddingProvider for LocalEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| anyhow!("Model returned no embedding"))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        tracing::debug!("Batch embedding {} texts", texts.len());
        let encoder = Arc::clone(&self.encoder);
        tokio::task::spawn_blocking(move || encoder.encode(texts))
            .await
            .context("Embedding task panicked")?
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
