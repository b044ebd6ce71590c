mod artifacts;
mod config;
mod errors;
mod llm_client;
mod pipeline;
mod render;
mod routes;
mod state;
mod tools;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LLM_API_KEY, SEARCH_API_KEY};
use crate::routes::build_router;
use crate::state::AppState;

/// Connect timeout for the scrape and search tools; each request sets its own total timeout.
const TOOL_CONNECT_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));
    info!("Secrets: {:?}", config.secrets);

    if config.secrets.llm_api_key.is_none() {
        warn!("{LLM_API_KEY} is not set; pipeline runs will be rejected until it is provided");
    }
    if config.secrets.search_api_key.is_none() {
        warn!("{SEARCH_API_KEY} is not set; job analysis will run without web search");
    }

    tokio::fs::create_dir_all(&config.work_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.work_dir.display()))?;
    info!("Working directory: {}", config.work_dir.display());

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(TOOL_CONNECT_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")?;

    let state = AppState {
        config: config.clone(),
        http,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
