//! Router configuration for the web server.

use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;
use crate::upload::MAX_UPLOAD_BYTES;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/chat", post(handlers::chat))
        // Alias to support clients calling /api/analyze/chat
        .route("/api/analyze/chat", post(handlers::chat))
        .route("/api/health", get(handlers::health))
        // The upload gate enforces the 15 MiB file limit; leave headroom
        // for multipart framing.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
