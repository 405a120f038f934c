//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bobbin_core::BobbinError;
use serde_json::json;
use tracing::error;

/// Errors leaving the HTTP layer as the legacy JSON error envelope.
pub enum ApiError {
    /// A core catalog error, mapped to a status by variant.
    Core(BobbinError),
    /// A malformed request body, rejected before reaching the core.
    BadRequest(String),
}

impl From<BobbinError> for ApiError {
    fn from(err: BobbinError) -> Self {
        ApiError::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Core(BobbinError::ModelNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Model not found".to_string())
            }
            ApiError::Core(BobbinError::SeriesNotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Series not found".to_string())
            }
            ApiError::Core(err @ BobbinError::UnknownCategory(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Core(err @ BobbinError::Validation { .. }) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Core(other) => {
                error!("Request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Shorthand for a 400 with an exact message, used where the request body
/// itself is malformed rather than a document field.
pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::BadRequest(message.into())
}
