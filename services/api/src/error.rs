//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service and the HTTP mapping of
//! the analysis workflow's failures.

use crate::config::ConfigError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seo_booster_core::{AnalysisError, PortError};
use serde::Serialize;
use utoipa::ToSchema;

/// The primary error type for the `api` service's startup path.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

//=========================================================================================
// HTTP Error Bodies
//=========================================================================================

/// The JSON body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// A stable machine-readable code, e.g. `quota_exceeded`.
    pub error: String,
    pub message: String,
    /// `true` when the UI should offer the premium upgrade instead of an error.
    pub upgrade: bool,
}

/// A failed request: status code plus body.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl HttpError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: code.to_string(),
                message: message.into(),
                upgrade: false,
            },
        }
    }

    fn upgrade_prompt(code: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new(StatusCode::PAYMENT_REQUIRED, code, message);
        err.body.upgrade = true;
        err
    }
}

impl From<AnalysisError> for HttpError {
    fn from(err: AnalysisError) -> Self {
        let message = err.to_string();
        match err {
            AnalysisError::EmptyInput => Self::new(StatusCode::BAD_REQUEST, "empty_input", message),
            AnalysisError::QuotaExceeded => Self::upgrade_prompt("quota_exceeded", message),
            AnalysisError::PremiumRequired(_) => Self::upgrade_prompt("premium_required", message),
            AnalysisError::Busy => Self::new(StatusCode::CONFLICT, "busy", message),
            AnalysisError::GenerationFailed => Self::new(
                StatusCode::BAD_GATEWAY,
                "generation_failed",
                "An error occurred while generating content. Please try again.",
            ),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
