//! Error types for the mock booking service.
//!
//! [`ApiError`] implements [`axum::response::IntoResponse`] so handlers can
//! return `Result<…, ApiError>` directly.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors a request to the mock service can produce.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No flight with this id exists.
    #[error("unknown flight {0}")]
    UnknownFlight(i64),

    /// The posted record is unusable.
    #[error("invalid flight: {0}")]
    InvalidFlight(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UnknownFlight(_) => StatusCode::NOT_FOUND,
            Self::InvalidFlight(_) => StatusCode::BAD_REQUEST,
        };
        let message = self.to_string();

        tracing::warn!(%status, error = %message, "request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
