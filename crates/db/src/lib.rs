pub mod conversions;
pub mod models;
pub mod pool;
pub mod queries;

pub use pool::create_pool;
pub use sqlx::PgPool;

/// If `err` wraps a Postgres unique violation, returns the constraint name.
///
/// The unique indexes on `booking_code`, `idempotency_key` and
/// `(idempotency_key, user_id)` are the only cross-process mutexes in the
/// system; callers branch on which one fired.
pub fn unique_violation(err: &anyhow::Error) -> Option<String> {
    let sqlx_err = err.downcast_ref::<sqlx::Error>()?;
    let db_err = sqlx_err.as_database_error()?;
    if db_err.is_unique_violation() {
        Some(db_err.constraint().unwrap_or_default().to_string())
    } else {
        None
    }
}
