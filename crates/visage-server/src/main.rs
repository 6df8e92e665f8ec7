//! Visage server binary.
//!
//! Face-similarity image search over HTTP.
//!
//! # Usage
//!
//! ```bash
//! visage-server [--config PATH] [--host HOST] [--port PORT] [--log-level LEVEL]
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/visage/config.toml)
//! 3. Environment variables (VISAGE_*)
//! 4. CLI flags

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use visage_embeddings::FixtureEmbedder;
use visage_server::{build_router, build_state};
use visage_types::Settings;

#[derive(Debug, Parser)]
#[command(name = "visage-server", about = "Face-similarity image search server")]
struct Cli {
    /// Path to a config file (overrides the default location)
    #[arg(long)]
    config: Option<String>,

    /// HTTP host to bind
    #[arg(long)]
    host: Option<String>,

    /// HTTP port to bind
    #[arg(long)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        settings.http_host = host;
    }
    if let Some(port) = cli.port {
        settings.http_port = port;
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }
    settings.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    // Face detection/embedding is an external capability behind the
    // FaceEmbedder trait; the fixture provider serves development setups
    // until a neural provider is plugged in here.
    let embedder = Arc::new(FixtureEmbedder::new(settings.dimension));

    let state = build_state(&settings, embedder)?;
    let app = build_router(state);

    let addr = settings.http_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, index = %settings.index_name, dim = settings.dimension, "Visage server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
