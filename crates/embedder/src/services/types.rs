use super::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message returned whenever a request carries no usable `texts` field.
pub const NO_TEXTS_PROVIDED: &str = "No texts provided";

/// Texts to embed, as sent by the client: one string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Single(String),
    Batch(Vec<String>),
}

impl TextInput {
    /// Normalize to a batch; a single string becomes a one-element batch.
    pub fn into_batch(self) -> Vec<String> {
        match self {
            TextInput::Single(text) => vec![text],
            TextInput::Batch(texts) => texts,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TextInput::Single(_) => 1,
            TextInput::Batch(texts) => texts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::Single(text.to_string())
    }
}

impl From<Vec<String>> for TextInput {
    fn from(texts: Vec<String>) -> Self {
        TextInput::Batch(texts)
    }
}

impl TryFrom<Value> for TextInput {
    type Error = ServiceError;

    /// Any value that is not an array is treated as a one-element batch, so
    /// `42` fails the same way `[42]` does.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(text) => Ok(TextInput::Single(text)),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| expect_string(index, item))
                .collect::<Result<Vec<_>, _>>()
                .map(TextInput::Batch),
            other => expect_string(0, other).map(TextInput::Single),
        }
    }
}

fn expect_string(index: usize, value: Value) -> Result<String, ServiceError> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(ServiceError::InferenceFailure(format!(
            "texts[{}] must be a string, found {}",
            index,
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `POST /embed` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub texts: TextInput,
}

impl EmbedRequest {
    /// Validate a raw request body.
    ///
    /// Unparseable JSON, a non-object, or an object without `texts` is a
    /// `BadRequest`. Non-string entries inside `texts` are an
    /// `InferenceFailure`, reported after the request shape was accepted.
    pub fn parse(body: &[u8]) -> Result<Self, ServiceError> {
        let no_texts = || ServiceError::BadRequest(NO_TEXTS_PROVIDED.to_string());

        let value: Value = serde_json::from_slice(body).map_err(|_| no_texts())?;
        let Value::Object(mut fields) = value else {
            return Err(no_texts());
        };
        let texts = fields.remove("texts").ok_or_else(no_texts)?;

        Ok(Self {
            texts: TextInput::try_from(texts)?,
        })
    }
}

/// `POST /embed` success body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

/// Body of every 4xx/5xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub dimensions: usize,
}

/// Process configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:3001`
    pub bind: String,
    /// Largest accepted request body, in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
            body_limit: 2 * 1024 * 1024,
        }
    }
}

/// Embedding model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// `local` or `ollama`
    pub provider: String,
    /// Hugging Face repo id for `local`, model tag for `ollama`
    pub name: String,
    /// Hub revision (branch, tag or commit) for `local`
    pub revision: String,
    /// Server URL for `ollama`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Token limit per text; longer inputs are truncated
    pub max_length: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "local".to_string(),
            name: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            revision: "main".to_string(),
            base_url: None,
            max_length: 256,
        }
    }
}
