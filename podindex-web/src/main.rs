//! podindex-web - podcast transcript dashboard server
//!
//! Configuration resolves in tiers: command line, environment, TOML file,
//! compiled defaults.

use anyhow::{Context, Result};
use clap::Parser;
use podindex_common::config::{resolve_config_path, AppConfig, CONFIG_ENV_VAR};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use podindex_web::data::DataAccess;
use podindex_web::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "podindex-web", version, about = "Podcast transcript dashboard")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Interface to bind, overriding the config file
    #[arg(long, env = "PODINDEX_HOST")]
    host: Option<String>,

    /// Port to listen on, overriding the config file
    #[arg(long, short = 'p', env = "PODINDEX_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting podindex-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let mut config = AppConfig::load(config_path.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let state = AppState::from_config(&config).context("Failed to build service clients")?;
    spawn_cache_sweeper(state.data.clone(), Duration::from_secs(config.cache.ttl_secs.max(1)));
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("podindex-web listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("podindex-web stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Periodically drop expired cache entries so memory tracks the live set
fn spawn_cache_sweeper(data: Arc<DataAccess>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = data.purge_expired().await;
            debug!(removed, "Swept expired cache entries");
        }
    });
}
