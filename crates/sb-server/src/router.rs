//! Router configuration.
//!
//! This module creates the main Axum router that combines all endpoints.

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    let health = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness_check))
        .route("/health/ready", get(handlers::readiness_check));

    let api = Router::new()
        .route("/api/user", get(handlers::current_user))
        .route("/api/session", get(handlers::session_data));

    Router::new()
        .route("/", get(handlers::root))
        .merge(api)
        .merge(health)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Builds the CORS layer.
///
/// Explicit origins are allowed with credentials so the session cookie is
/// sent. A `*` entry falls back to any origin without credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
