//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, usage, usage_types};
use crate::state::AppState;

/// Maximum concurrent requests for the API collections.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Usage (bearer JWT auth)
/// - `GET /usage` - List usage events (filterable, orderable, paginated)
/// - `POST /usage` - Record a usage event
/// - `GET /usage/:id` - Retrieve a usage event
/// - `PUT /usage/:id` - Replace a usage event
/// - `PATCH /usage/:id` - Partially update a usage event
/// - `DELETE /usage/:id` - Delete a usage event
///
/// ## Usage types (bearer JWT auth)
/// - Same six operations under `/usage_types`
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/usage", get(usage::list).post(usage::create))
        .route(
            "/usage/:id",
            get(usage::retrieve)
                .put(usage::update)
                .patch(usage::partial_update)
                .delete(usage::destroy),
        )
        .route(
            "/usage_types",
            get(usage_types::list).post(usage_types::create),
        )
        .route(
            "/usage_types/:id",
            get(usage_types::retrieve)
                .put(usage_types::update)
                .patch(usage_types::partial_update)
                .delete(usage_types::destroy),
        )
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no concurrency limit)
        .route("/health", get(health::health))
        .merge(api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
