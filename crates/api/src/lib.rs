//! Phonebook API library.
//!
//! This crate provides the HTTP service as a library, allowing it to be
//! tested and reused by the binary entrypoint.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod validate;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, StatusCode};
use axum::{Router, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
#[must_use]
pub fn app(state: AppState) -> Router {
    let rate_limiter = middleware::auth_rate_limiter(
        state.config().rate_limit_window_secs,
        state.config().rate_limit_max,
    );

    // Give multipart framing some headroom over the file cap itself; the
    // precise per-file limit is enforced in the import service.
    let body_limit = DefaultBodyLimit::max(state.config().max_upload_bytes * 2);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", routes::auth_routes().layer(rate_limiter))
        .nest("/phonebooks", routes::phonebook_routes())
        .layer(body_limit)
        .layer(cors_layer(state.config()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Build the CORS layer from the configured origin list.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
