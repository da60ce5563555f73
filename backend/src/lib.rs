//! FarmGuard AI backend
//!
//! HTTP server for crop identification, plant disease detection and a
//! farming chat assistant.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use shared::{CropClass, DiseaseClass};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

use external::LlmClient;
use services::{ChatService, Classifier, ImageStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub images: ImageStore,
    pub crop: Arc<Classifier<CropClass>>,
    pub disease: Arc<Classifier<DiseaseClass>>,
    pub chat: ChatService,
}

impl AppState {
    /// Build the state from configuration
    ///
    /// Missing model artifacts put the matching classifier in demo mode.
    /// Uploads left over from a previous run are swept unless disabled.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let images = ImageStore::new(
            config.storage.upload_dir.clone(),
            config.storage.cleanup_delay(),
        );
        images.ensure_dir()?;
        if config.storage.sweep_on_startup {
            images.sweep()?;
        }

        let crop = Classifier::load_or_demo(&config.models.crop_path);
        let disease = Classifier::load_or_demo(&config.models.disease_path);

        let llm = LlmClient::from_config(&config.llm)?;
        match &llm {
            Some(client) => tracing::info!("LLM chat enabled ({})", client.model()),
            None => tracing::info!("No LLM API key configured, chat uses keyword replies"),
        }

        Ok(Self {
            config: Arc::new(config),
            images,
            crop: Arc::new(crop),
            disease: Arc::new(disease),
            chat: ChatService::new(llm),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config.server.max_upload_bytes;

    routes::api_routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
