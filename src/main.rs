//! dot-quote-bridge - Dot. Quote/0 polling bridge
//!
//! Polls the Dot. cloud API for every e-ink device on an account, exposes
//! their status and controls as entities over HTTP, and forwards send-text /
//! send-image actions to the devices.

mod api;
mod config;
mod dot;
mod entities;
mod error;
mod models;
mod services;
mod setup;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::dot::{DotClient, DotSyncer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dot_quote_bridge=info,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting dot-quote-bridge...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded (API: {})", config.dot.base_url);

    // Validate the credential and fetch the device list
    let client = Arc::new(DotClient::new(&config.dot)?);
    let entry = setup::validate(&*client, &config.dot.api_key)
        .await
        .map_err(|e| anyhow::anyhow!("Setup failed [{}]: {}", e.code(), e))?;
    tracing::info!("Setup complete: {}", entry.title);

    // First refresh must succeed before the API comes up
    let syncer = Arc::new(DotSyncer::new(
        client,
        entry.devices,
        Duration::from_secs(config.dot.scan_interval_secs),
    ));
    syncer
        .first_refresh()
        .await
        .map_err(|e| anyhow::anyhow!("Initial poll failed: {}", e))?;

    // Poll loop
    let poller = syncer.clone();
    tokio::spawn(async move {
        poller.start().await;
    });

    // Build application router
    let app = api::routes()
        .with_state(AppState::new(syncer, config.dot.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
