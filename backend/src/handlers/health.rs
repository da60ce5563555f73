//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub crop_model: String,
    pub disease_model: String,
    pub llm: String,
}

/// Root endpoint
pub async fn root() -> &'static str {
    "🌿 FarmGuard AI Backend running successfully!"
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm_status = if state.chat.llm_enabled() {
        "configured"
    } else {
        "disabled"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        crop_model: state.crop.mode().to_string(),
        disease_model: state.disease.mode().to_string(),
        llm: llm_status.to_string(),
    })
}
