//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, HttpError};
use crate::web::protocol::{
    AnalyzeRequest, AnalyzeResponse, HistoryEntryView, QuotaView, UpgradeRequest, UserView,
};
use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use seo_booster_core::export::{csv_file_name, result_to_csv};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_user_handler,
        analyze_handler,
        delete_entry_handler,
        clear_history_handler,
        upgrade_handler,
        reset_handler,
        export_csv_handler,
    ),
    components(
        schemas(
            AnalyzeRequest,
            AnalyzeResponse,
            UpgradeRequest,
            UserView,
            QuotaView,
            HistoryEntryView,
            ErrorBody
        )
    ),
    tags(
        (name = "SEO Booster API", description = "Local endpoints behind the SEO Booster UI.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Returns the current user record and quota.
#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Current user record", body = UserView)
    )
)]
pub async fn get_user_handler(State(app_state): State<Arc<AppState>>) -> Json<UserView> {
    let store = app_state.store().lock().await;
    Json(UserView::from_store(&store))
}

/// Runs one analysis and records it in the history.
#[utoipa::path(
    post,
    path = "/analyses",
    request_body = AnalyzeRequest,
    responses(
        (status = 201, description = "Analysis generated and recorded", body = AnalyzeResponse),
        (status = 400, description = "Empty input or malformed request", body = ErrorBody),
        (status = 402, description = "Quota exhausted or premium feature; show the upgrade prompt", body = ErrorBody),
        (status = 409, description = "Another analysis is still running", body = ErrorBody),
        (status = 502, description = "Content generation failed; safe to retry", body = ErrorBody)
    )
)]
pub async fn analyze_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(req) = payload?;
    let entry = app_state.analyzer.submit(req.into()).await?;

    let store = app_state.store().lock().await;
    let response = AnalyzeResponse {
        entry: HistoryEntryView::from(&entry),
        user: UserView::from_store(&store),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Removes one history entry. Unknown ids are ignored.
#[utoipa::path(
    delete,
    path = "/history/{id}",
    params(
        ("id" = String, Path, description = "The id of the history entry.")
    ),
    responses(
        (status = 200, description = "Updated user record", body = UserView)
    )
)]
pub async fn delete_entry_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<UserView> {
    let mut store = app_state.store().lock().await;
    if store.delete_entry(&id).await {
        info!(id = %id, "History entry deleted");
    }
    Json(UserView::from_store(&store))
}

/// Empties the history. Tier and request count are untouched.
#[utoipa::path(
    delete,
    path = "/history",
    responses(
        (status = 200, description = "Updated user record", body = UserView)
    )
)]
pub async fn clear_history_handler(State(app_state): State<Arc<AppState>>) -> Json<UserView> {
    let mut store = app_state.store().lock().await;
    store.clear_history().await;
    Json(UserView::from_store(&store))
}

/// Upgrades the user to premium.
#[utoipa::path(
    post,
    path = "/upgrade",
    request_body = UpgradeRequest,
    responses(
        (status = 200, description = "Updated user record", body = UserView),
        (status = 400, description = "Invalid email or malformed request", body = ErrorBody)
    )
)]
pub async fn upgrade_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<UpgradeRequest>, JsonRejection>,
) -> Result<Json<UserView>, HttpError> {
    let Json(req) = payload?;
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            "invalid_email",
            "A valid email address is required to upgrade",
        ));
    }

    let mut store = app_state.store().lock().await;
    store.upgrade(email).await;
    info!("User upgraded to premium");
    Ok(Json(UserView::from_store(&store)))
}

/// Clears all personal data and returns the record to its defaults.
#[utoipa::path(
    post,
    path = "/reset",
    responses(
        (status = 200, description = "Default user record", body = UserView)
    )
)]
pub async fn reset_handler(State(app_state): State<Arc<AppState>>) -> Json<UserView> {
    let mut store = app_state.store().lock().await;
    store.reset_all().await;
    info!("User record reset to defaults");
    Json(UserView::from_store(&store))
}

/// Downloads one history entry's result as CSV.
#[utoipa::path(
    get,
    path = "/history/{id}/export.csv",
    params(
        ("id" = String, Path, description = "The id of the history entry.")
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
        (status = 404, description = "No such history entry", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn export_csv_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let (analysis_type, csv) = {
        let store = app_state.store().lock().await;
        let entry = store.entry(&id).ok_or_else(|| {
            HttpError::new(
                StatusCode::NOT_FOUND,
                "not_found",
                format!("No history entry with id '{}'", id),
            )
        })?;
        let csv = result_to_csv(&entry.result).map_err(|e| {
            error!("Failed to export history entry {}: {:?}", id, e);
            HttpError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "export_failed",
                "Failed to export result",
            )
        })?;
        (entry.analysis_type, csv)
    };

    let disposition = format!("attachment; filename=\"{}\"", csv_file_name(analysis_type));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
