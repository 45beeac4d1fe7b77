pub mod bookings;
pub mod payments;
pub mod showtimes;

use axum::http::HeaderMap;
use cineseat_types::{codes, AppError};
use uuid::Uuid;

use crate::response::ApiError;

/// Extract and canonicalize the `X-Idempotency-Key` header (UUID-v4 textual
/// form at this boundary; the core treats it as an opaque string).
pub fn idempotency_key(headers: &HeaderMap) -> Result<String, ApiError> {
    let raw = headers
        .get("x-idempotency-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError(AppError::Validation(
                codes::INVALID_IDEMPOTENCY_KEY,
                "X-Idempotency-Key header is required".into(),
            ))
        })?;

    let parsed: Uuid = raw.trim().parse().map_err(|_| {
        ApiError(AppError::Validation(
            codes::INVALID_IDEMPOTENCY_KEY,
            "X-Idempotency-Key must be a UUID".into(),
        ))
    })?;

    Ok(parsed.to_string())
}
