//! # certify-api: Binary Entry Point
//!
//! Connects to the registry contract, then starts the HTTP server on
//! `PORT` (default 3000). The server starts even when the chain is
//! unreachable; certificate routes answer 503 until it is.

use certify_api::bootstrap;
use certify_api::state::{AppConfig, AppState};
use certify_chain::ChainConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("invalid server configuration: {e}");
        e
    })?;
    let chain_config = ChainConfig::from_env().map_err(|e| {
        tracing::error!("invalid chain configuration: {e}");
        e
    })?;

    let outcome = bootstrap::initialize_chain(chain_config).await;
    bootstrap::log_banner(&config, &outcome);

    let port = config.port;
    let state = AppState::with_chain(config, outcome.status);
    let app = certify_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("certificate API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
