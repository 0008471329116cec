use super::types::EmbedderConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

/// Environment variable prefix; nested keys are separated by `__`,
/// e.g. `EMBEDDER_SERVER__BIND`.
pub const ENV_PREFIX: &str = "EMBEDDER_";

/// Service for configuration loading
pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Load defaults, then the TOML file if present, then env var overrides.
    pub fn load(&self) -> Result<EmbedderConfig> {
        let mut figment = Figment::from(Serialized::defaults(EmbedderConfig::default()));

        if self.config_path.exists() {
            tracing::debug!("Reading configuration from {}", self.config_path.display());
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: EmbedderConfig = figment.extract().context("Failed to load configuration")?;
        Ok(config)
    }

    /// Check if the configuration file exists
    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }
}
