//! Route definitions for the Civicmap HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::http::{HeaderValue, Method};
use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use civicmap_core::config::app::CorsConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(collaboration_routes())
        .merge(notification_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Collaboration request/accept/decline endpoints.
fn collaboration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/collaborations",
            post(handlers::collaboration::create_collaboration),
        )
        .route(
            "/collaborations",
            get(handlers::collaboration::list_collaborations),
        )
        .route(
            "/collaborations/accept",
            post(handlers::collaboration::accept_collaboration),
        )
        .route(
            "/collaborations/decline",
            post(handlers::collaboration::decline_collaboration),
        )
}

/// Notification endpoints.
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

/// Health check endpoints (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();
    cors = cors.allow_methods(methods);

    cors.max_age(std::time::Duration::from_secs(config.max_age_seconds))
}
