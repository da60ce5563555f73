//! FarmGuard AI - Backend Server
//!
//! Crop and plant disease detection plus a farming assistant for the
//! FarmGuard web app.

use farmguard_backend::{create_app, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "farmguard_server=debug,farmguard_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting FarmGuard AI Server");
    tracing::info!("Environment: {}", config.environment);

    let addr = config.bind_address();
    let state = AppState::from_config(config)?;
    tracing::info!(
        "Crop model: {}, disease model: {}",
        state.crop.mode(),
        state.disease.mode()
    );

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
