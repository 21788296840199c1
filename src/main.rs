// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::load_app_config;
use crate::infrastructure::upstream_client::HttpAqiApi;
use crate::presentation::app_state::AppState;
use crate::presentation::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("aqi_dashboard=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create upstream client (infrastructure layer)
    let api = Arc::new(HttpAqiApi::new(config.upstream.clone()).context("building AQI client")?);

    // Create services (application layer)
    let state = AppState::new(api, &config.dashboard);

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;
    tracing::info!(
        %addr,
        upstream = %config.upstream.base_url,
        scale = %config.dashboard.scale,
        "Starting aqi-dashboard"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, router).await?;

    Ok(())
}
