mod config;
mod errors;
mod llm_client;
mod middleware;
mod pipeline;
mod profile;
mod radar;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::errors::set_dev_mode;
use crate::llm_client::OpenAiClient;
use crate::pipeline::parser::ScanMode;
use crate::pipeline::prompts::PromptStore;
use crate::pipeline::ProfilePipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Profiler API v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app_env);

    set_dev_mode(config.is_development());

    // Initialize LLM gateway
    let gateway = Arc::new(OpenAiClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));
    info!("LLM gateway initialized (model: {})", gateway.model());

    // Initialize prompt store and pipeline
    let prompts = PromptStore::new(config.prompts_dir.clone());
    let scan_mode = if config.strict_json_scan {
        ScanMode::Balanced
    } else {
        ScanMode::FirstLast
    };
    let pipeline = ProfilePipeline::new(gateway, prompts, scan_mode);

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
        started_at: Instant::now(),
    };

    // CORS is pinned to the frontend origin; credentials require an
    // explicit origin rather than a wildcard.
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<HeaderValue>()
                .context("FRONTEND_URL must be a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
