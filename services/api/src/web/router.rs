//! services/api/src/web/router.rs
//!
//! Assembles the HTTP router: API routes, CORS for the UI origin and the
//! Swagger UI.

use crate::config::ConfigError;
use crate::web::{
    rest::{
        analyze_handler, clear_history_handler, delete_entry_handler, export_csv_handler,
        get_user_handler, reset_handler, upgrade_handler, ApiDoc,
    },
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router for `app_state`.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ConfigError> {
    let origin = app_state
        .config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let api_router = Router::new()
        .route("/user", get(get_user_handler))
        .route("/analyses", post(analyze_handler))
        .route("/history", delete(clear_history_handler))
        .route("/history/{id}", delete(delete_entry_handler))
        .route("/history/{id}/export.csv", get(export_csv_handler))
        .route("/upgrade", post(upgrade_handler))
        .route("/reset", post(reset_handler))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
