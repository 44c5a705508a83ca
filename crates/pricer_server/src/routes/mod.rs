//! Route modules for the pricer server
//!
//! This module contains endpoint group-specific routers:
//! - pricing: JSON pricing endpoints and the HTML pricing form
//! - health: Health check and readiness endpoints

pub mod health;
pub mod pricing;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self {
            config,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the main application router by merging all route modules
pub fn build_router(config: Arc<ServerConfig>) -> Router {
    let state = AppState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::routes())
        .merge(pricing::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(Arc::new(ServerConfig::default()))
    }

    #[tokio::test]
    async fn test_router_merges_all_route_groups() {
        let router = router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/price").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/price/binomial")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"spot":100,"strike":100,"maturity":1,"rate":0.05,"volatility":0.2,"steps":100,"kind":"call"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_redirects_to_form() {
        let response = router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/price");
    }

    #[tokio::test]
    async fn test_unknown_route_returns_404() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/unknown/path")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_app_state_config_access() {
        let config = ServerConfig {
            port: 9999,
            ..Default::default()
        };
        let state = AppState::new(Arc::new(config));

        assert_eq!(state.config.port, 9999);
    }
}
