//! Marketing Dashboard API Server
//!
//! HTTP API server for market research and marketing content generation.

mod error;
mod routes;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use bizdash_services::{generate_delay_from_env, ContentService, ResearchConfig, ResearchService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub research_service: Arc<ResearchService>,
    pub content_service: Arc<ContentService>,
    /// Cancelled on shutdown; handlers derive per-request child tokens
    pub shutdown: CancellationToken,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bizdash_api=debug")),
        )
        .init();

    info!("Starting Marketing Dashboard API");

    let research_config =
        ResearchConfig::from_env().context("Failed to load research configuration")?;
    info!(
        "Research configuration: live research {}, extraction backend {} ({})",
        if research_config.perplexity_api_key.is_some() { "enabled" } else { "disabled (simulation only)" },
        research_config.extraction_backend,
        if research_config.extraction_api_key().is_some() { "configured" } else { "missing key" },
    );

    let research_service = ResearchService::new(&research_config)
        .context("Failed to initialize research service")?;
    let content_service = ContentService::new(
        generate_delay_from_env().context("Failed to load content generation configuration")?,
    );

    let shutdown = CancellationToken::new();

    // Create app state
    let state = AppState {
        research_service: Arc::new(research_service),
        content_service: Arc::new(content_service),
        shutdown: shutdown.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors_layer()?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Configure CORS for the frontend.
///
/// CORS_ORIGINS is a `;`-separated allow list; any origin is allowed when unset.
fn cors_layer() -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let origins = match std::env::var("CORS_ORIGINS") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(cors.allow_origin(Any)),
    };

    let origins = origins
        .split(';')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid origin in CORS_ORIGINS: {}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    info!("CORS restricted to {} origin(s)", origins.len());
    Ok(cors.allow_origin(origins))
}

/// Resolve on ctrl-c and cancel in-flight pipelines
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, cancelling in-flight requests");
    shutdown.cancel();
}
