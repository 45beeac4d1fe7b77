use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Stable error code strings surfaced in the API error envelope.
pub mod codes {
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const INVALID_SEAT: &str = "INVALID_SEAT";
    pub const INVALID_IDEMPOTENCY_KEY: &str = "INVALID_IDEMPOTENCY_KEY";
    pub const KEY_REUSED_DIFFERENT_BODY: &str = "KEY_REUSED_DIFFERENT_BODY";
    pub const REQUEST_IN_FLIGHT: &str = "REQUEST_IN_FLIGHT";
    pub const BAD_PROVIDER: &str = "BAD_PROVIDER";

    pub const SHOWTIME_NOT_FOUND: &str = "SHOWTIME_NOT_FOUND";
    pub const SHOWTIME_NOT_AVAILABLE: &str = "SHOWTIME_NOT_AVAILABLE";
    pub const SHOWTIME_ALREADY_STARTED: &str = "SHOWTIME_ALREADY_STARTED";

    pub const SEATS_NOT_AVAILABLE: &str = "SEATS_NOT_AVAILABLE";

    pub const BOOKING_NOT_FOUND: &str = "BOOKING_NOT_FOUND";
    pub const BOOKING_NOT_OWNED: &str = "BOOKING_NOT_OWNED";
    pub const BOOKING_CANNOT_BE_CANCELLED: &str = "BOOKING_CANNOT_BE_CANCELLED";
    pub const BOOKING_HOLD_EXPIRED: &str = "BOOKING_HOLD_EXPIRED";
    pub const BOOKING_ALREADY_PAID: &str = "BOOKING_ALREADY_PAID";
    pub const BOOKING_PERSIST_FAILED: &str = "BOOKING_PERSIST_FAILED";

    pub const BOOKING_NOT_PENDING: &str = "BOOKING_NOT_PENDING";

    pub const PAYMENT_NOT_FOUND: &str = "PAYMENT_NOT_FOUND";
    pub const PAYMENT_NOT_OWNED: &str = "PAYMENT_NOT_OWNED";

    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const ENGINE_ERROR: &str = "ENGINE_ERROR";
    pub const GATEWAY_ERROR: &str = "GATEWAY_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad payload, unknown seat, bad provider, mismatched idempotency hash.
    #[error("{1}")]
    Validation(&'static str, String),

    #[error("{1}")]
    NotFound(&'static str, String),

    #[error("{1}")]
    Forbidden(&'static str, String),

    #[error("{1}")]
    Conflict(&'static str, String),

    /// Booking expired, showtime started, booking not pending.
    #[error("{1}")]
    PreconditionFailed(&'static str, String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Reservation engine error: {0}")]
    Engine(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("{1}")]
    Internal(&'static str, String),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(..) | Self::PreconditionFailed(..) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(..) => 403,
            Self::NotFound(..) => 404,
            Self::Conflict(..) => 409,
            Self::ExternalService(_) => 502,
            Self::Database(_) | Self::Engine(_) | Self::Internal(..) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(code, _)
            | Self::NotFound(code, _)
            | Self::Forbidden(code, _)
            | Self::Conflict(code, _)
            | Self::PreconditionFailed(code, _)
            | Self::Internal(code, _) => code,
            Self::Unauthorized(_) => codes::UNAUTHORIZED,
            Self::Database(_) => codes::DATABASE_ERROR,
            Self::Engine(_) => codes::ENGINE_ERROR,
            Self::ExternalService(_) => codes::GATEWAY_ERROR,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(codes::INTERNAL_ERROR, message.into())
    }

    /// The envelope every error path serializes to, cached verbatim by the
    /// idempotency layer so retries replay byte-identical failures.
    pub fn to_envelope(&self) -> serde_json::Value {
        serde_json::json!({
            "statusCode": self.status_code(),
            "errorCode": self.error_code(),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_by_kind() {
        assert_eq!(
            AppError::Validation(codes::INVALID_SEAT, "bad seat".into()).status_code(),
            400
        );
        assert_eq!(
            AppError::NotFound(codes::BOOKING_NOT_FOUND, "missing".into()).status_code(),
            404
        );
        assert_eq!(
            AppError::Conflict(codes::SEATS_NOT_AVAILABLE, "taken".into()).status_code(),
            409
        );
        assert_eq!(
            AppError::Forbidden(codes::BOOKING_NOT_OWNED, "not yours".into()).status_code(),
            403
        );
        assert_eq!(AppError::internal("boom").status_code(), 500);
    }

    #[test]
    fn test_error_code_passthrough() {
        let err = AppError::PreconditionFailed(codes::BOOKING_HOLD_EXPIRED, "expired".into());
        assert_eq!(err.error_code(), "BOOKING_HOLD_EXPIRED");
        assert_eq!(err.to_string(), "expired");

        let persist = AppError::Internal(codes::BOOKING_PERSIST_FAILED, "insert failed".into());
        assert_eq!(persist.error_code(), "BOOKING_PERSIST_FAILED");
        assert_eq!(persist.status_code(), 500);
    }

    #[test]
    fn test_envelope_shape() {
        let err = AppError::Conflict(codes::SEATS_NOT_AVAILABLE, "A1 is held".into());
        let envelope = err.to_envelope();
        assert_eq!(envelope["statusCode"], 409);
        assert_eq!(envelope["errorCode"], "SEATS_NOT_AVAILABLE");
        assert_eq!(envelope["message"], "A1 is held");
        assert!(envelope["timestamp"].is_string());
    }
}
