//! Route definitions for the FarmGuard AI backend

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Image classification
        .route("/detect-crop", post(handlers::detect_crop))
        .route("/detect-disease", post(handlers::detect_disease))
        // Assistant
        .route("/chat", post(handlers::chat))
}
