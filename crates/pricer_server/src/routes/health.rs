//! Health check and readiness endpoints
//!
//! Provides health and readiness probes for load balancer integration.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Health status ("healthy" or "unhealthy")
    pub status: String,
    /// Server version
    pub version: String,
    /// Server uptime in seconds
    pub uptime_secs: u64,
    /// Pricing limits in force
    pub limits: Limits,
}

/// Request caps reported by the health check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Limits {
    /// Largest accepted path count
    pub max_paths: usize,
    /// Largest accepted step count
    pub max_steps: usize,
    /// Whether Monte Carlo runs in parallel by default
    pub parallel_mc: bool,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Ready status
    pub ready: bool,
}

/// Build the health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
}

/// GET /health - Health check endpoint
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        limits: Limits {
            max_paths: state.config.max_paths,
            max_steps: state.config.max_steps,
            parallel_mc: state.config.parallel_mc,
        },
    };

    (StatusCode::OK, Json(response))
}

/// GET /ready - Readiness probe endpoint
async fn ready_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(ReadyResponse { ready: true }))
}
