pub mod config;
pub mod embed;
pub mod types;

pub use config::ConfigService;
pub use embed::EmbedService;
pub use types::{
    EmbedRequest, EmbedResponse, EmbedderConfig, ErrorResponse, HealthResponse, ModelConfig,
    ServerConfig, TextInput, NO_TEXTS_PROVIDED,
};

/// Failure of a single embedding request.
///
/// The display string is sent to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    InferenceFailure(String),
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::InferenceFailure(format!("{:#}", err))
    }
}
