//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Rejected webhook: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Unauthorized => {
                tracing::warn!("Rejected webhook with invalid token");
                (StatusCode::UNAUTHORIZED, "Invalid webhook token".to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Malformed payload: {}", err))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
