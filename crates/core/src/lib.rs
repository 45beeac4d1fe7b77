pub mod booking;
pub mod idempotency;
pub mod payment;
pub mod showtime;

use cineseat_engine::EngineError;
use cineseat_types::{codes, AppError};

/// Map a db-layer error into the app taxonomy, keeping sqlx errors visible
/// as DATABASE_ERROR instead of a generic 500.
pub(crate) fn db_error(err: anyhow::Error) -> AppError {
    match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Database(sqlx_err),
        Err(other) => AppError::internal(other.to_string()),
    }
}

/// Map an engine error; invalid input surfaces as a 400, everything else is
/// infrastructure.
pub(crate) fn engine_error(err: EngineError) -> AppError {
    match err {
        EngineError::InvalidInput(msg) => AppError::Validation(codes::INVALID_INPUT, msg),
        other => AppError::Engine(other.to_string()),
    }
}
