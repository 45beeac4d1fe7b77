//! Error envelope and replay helpers shared by all route handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cineseat_types::AppError;
use serde_json::Value;

/// Wrapper turning an [`AppError`] into the categorized JSON envelope
/// `{statusCode, errorCode, message, timestamp}`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.error_code(), "request failed");
        }

        (status, Json(self.0.to_envelope())).into_response()
    }
}

/// Return a cached idempotent response verbatim, with its original status.
pub fn replay(status_code: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::OK);
    (status, Json(body)).into_response()
}
