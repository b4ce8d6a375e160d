use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::progress::TrackerError;

/// Generic notice for a failed generation when the remote gave no reason.
pub const GENERATION_RETRY_MESSAGE: &str = "Failed to generate roadmap. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Remote generation error: {0}")]
    Remote(String),
}

impl From<TrackerError> for AppError {
    fn from(e: TrackerError) -> Self {
        AppError::OutOfRange(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::OutOfRange(msg) => {
                // Indices come from the client's last render; a miss means it is stale.
                tracing::warn!("Stale week index: {msg}");
                (StatusCode::NOT_FOUND, "OUT_OF_RANGE", msg.clone())
            }
            AppError::Remote(msg) => {
                tracing::error!("Roadmap generation failed: {msg}");
                (StatusCode::BAD_GATEWAY, "REMOTE_ERROR", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
