//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FileRecordStorage, GeminiContentAdapter, MockContentAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use seo_booster_core::{Analyzer, ContentGenerationService, SessionStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Local Storage & Load the User Record ---
    info!("Opening storage at {}", config.storage_dir.display());
    let storage = Arc::new(FileRecordStorage::new(&config.storage_dir).await?);
    let (store, outcome) =
        SessionStore::load(storage, config.storage_key.clone(), config.free_tier_limit).await;
    info!("User record ready: {:?}", outcome);

    // --- 3. Initialize the Content Generator ---
    let generator: Arc<dyn ContentGenerationService> = match &config.gemini_api_key {
        Some(api_key) => {
            info!("Using {} for content generation", config.generation_model);
            let client = GeminiContentAdapter::client_for(api_key, &config.gemini_api_base);
            Arc::new(GeminiContentAdapter::new(client, config.generation_model.clone()))
        }
        None => {
            warn!("GEMINI_API_KEY is not set. Serving mock results; AI features will not work.");
            Arc::new(MockContentAdapter::default())
        }
    };

    // --- 4. Build the Shared AppState ---
    let analyzer = Arc::new(Analyzer::new(
        Arc::new(Mutex::new(store)),
        generator,
        config.generation_timeout,
    ));
    let app_state = Arc::new(AppState {
        config: config.clone(),
        analyzer,
    });

    // --- 5. Create the Web Router ---
    let app = build_router(app_state)?;

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
