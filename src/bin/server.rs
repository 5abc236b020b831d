//! monolink revalidation server
//!
//! Serves `POST /api/revalidate` and `GET /health`. Configuration comes from
//! the file named by `MONOLINK_CONFIG` (default `config.toml`) and the
//! environment.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use monolink::{
    cache::MemoryPageCache,
    config::load_config,
    error::Result,
    server::{AppState, router},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_ENV: &str = "MONOLINK_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config_path =
        PathBuf::from(std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".into()));
    let config = load_config(Some(&config_path))?;

    let cache = Arc::new(MemoryPageCache::new(Duration::from_secs(
        config.revalidation.interval_secs,
    )));
    let state = AppState::from_config(&config, cache)?;

    let listener = TcpListener::bind(config.revalidation.bind_addr.as_str()).await?;
    tracing::info!(addr = %config.revalidation.bind_addr, "monolink server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("monolink server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
