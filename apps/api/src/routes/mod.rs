pub mod health;

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use crate::middleware::rate_limit::{rate_limit, RateLimiter};
use crate::profile::handlers as profile_handlers;
use crate::radar::handlers as radar_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let general_limiter = RateLimiter::general(
        state.config.rate_limit_max_requests,
        Duration::from_millis(state.config.rate_limit_window_ms),
    );
    let upload_limiter = RateLimiter::upload();
    let llm_limiter = RateLimiter::llm();

    // Configured cap plus slack for multipart framing. Bodies cut off at
    // this limit surface as the same "File too large" response the
    // in-handler size check produces.
    let upload_body_limit = state.config.max_file_size_bytes() + 64 * 1024;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/upload-cv",
            post(profile_handlers::handle_upload_cv)
                // Chained `MethodRouter::layer` calls leave the middle
                // service's error type unconstrained; pin it so inference
                // resolves.
                .layer::<_, Infallible>(middleware::from_fn_with_state(upload_limiter, rate_limit))
                .layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(
            "/api/extract-profile",
            post(profile_handlers::handle_extract_profile).layer(
                middleware::from_fn_with_state(llm_limiter.clone(), rate_limit),
            ),
        )
        .route(
            "/api/submit-manual-data",
            post(profile_handlers::handle_submit_manual_data),
        )
        .route(
            "/api/generate-radar-scores",
            post(radar_handlers::handle_generate_radar_scores)
                .layer(middleware::from_fn_with_state(llm_limiter, rate_limit)),
        )
        .route(
            "/api/radar-config",
            get(radar_handlers::handle_radar_config),
        )
        .fallback(handle_not_found)
        .layer(middleware::from_fn_with_state(general_limiter, rate_limit))
        .with_state(state)
}

async fn handle_not_found(request: Request) -> impl IntoResponse {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    warn!("404 - Route not found: {method} {path}");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "method": method.as_str(),
            "path": path,
        })),
    )
}
