//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::logic::DetectError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Model errors
    ModelUnavailable(String),

    // Validation errors
    ValidationError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ModelUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<DetectError> for AppError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::ModelUnavailable(_) => AppError::ModelUnavailable(err.to_string()),
            DetectError::InvalidInput(msg) => AppError::ValidationError(msg),
            DetectError::FeatureSchemaUnset
            | DetectError::Inference(_)
            | DetectError::Artifact(_) => AppError::InternalError(err.to_string()),
        }
    }
}
