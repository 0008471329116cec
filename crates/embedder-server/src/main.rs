use anyhow::{Context, Result};
use clap::Parser;
use embedder::services::ConfigService;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod state;

#[derive(Parser)]
#[command(name = "embedder-server", version, about = "Serve sentence embeddings over HTTP")]
struct Cli {
    /// TOML configuration file; skipped if missing
    #[arg(long, env = "EMBEDDER_CONFIG", default_value = "embedder.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ConfigService::new(&cli.config).load()?;

    // Nothing is bound until the model is ready.
    let state = state::AppState::load(&config.model).await?;
    let app = api::build_router(state, config.server.body_limit);

    tracing::info!("Starting embedding server on {}", config.server.bind);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
