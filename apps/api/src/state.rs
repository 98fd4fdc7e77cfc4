use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::pipeline::ProfilePipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProfilePipeline>,
    pub config: Config,
    /// Process start time, reported as uptime by the health endpoint.
    pub started_at: Instant,
}
