//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication and rate limiting middleware
//! - Request extractors
//! - Error responses

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use budgetrack_core::ratelimit::RateLimiter;
use budgetrack_shared::JwtService;
use budgetrack_shared::types::CurrencyCode;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Per-client request limiter.
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Key clients by `X-Forwarded-For` instead of the peer address.
    pub trust_forwarded_for: bool,
    /// Currency imported actuals are converted into.
    pub base_currency: CurrencyCode,
}

/// Limits applied by the outer router layers.
#[derive(Debug, Clone, Copy)]
pub struct RouterLimits {
    /// Per-request deadline.
    pub request_timeout: Duration,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl Default for RouterLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState, limits: RouterLimits) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            limits.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
