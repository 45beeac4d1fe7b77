use crate::models::Booking;
use anyhow::Result;
use chrono::{DateTime, Utc};
use cineseat_types::api::BookingSeat;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields of a booking at creation time; everything else is defaulted.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub booking_code: String,
    pub seats: Vec<BookingSeat>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub currency: String,
    pub held_at: DateTime<Utc>,
    pub hold_expires_at: DateTime<Utc>,
    pub idempotency_key: String,
}

/// Insert a pending booking. Unique violations (booking_code,
/// idempotency_key) surface to the caller via [`crate::unique_violation`].
pub async fn create(pool: &PgPool, new: &NewBooking) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            id, user_id, showtime_id, booking_code, seats,
            total_amount, discount_amount, final_amount, currency,
            status, held_at, hold_expires_at, idempotency_key
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.user_id)
    .bind(new.showtime_id)
    .bind(&new.booking_code)
    .bind(Json(&new.seats))
    .bind(new.total_amount)
    .bind(new.discount_amount)
    .bind(new.final_amount)
    .bind(&new.currency)
    .bind(new.held_at)
    .bind(new.hold_expires_at)
    .bind(&new.idempotency_key)
    .fetch_one(pool)
    .await?;

    Ok(booking)
}

/// Find booking by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(booking)
}

/// Find the booking a hold request already created under this key, if any
pub async fn find_by_idempotency_key(
    pool: &PgPool,
    user_id: Uuid,
    idempotency_key: &str,
) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE idempotency_key = $1 AND user_id = $2",
    )
    .bind(idempotency_key)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// pending -> confirmed. Returns None if the booking was not pending.
pub async fn confirm(pool: &PgPool, id: Uuid) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'confirmed',
            confirmed_at = NOW(),
            updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// pending -> cancelled with a reason. Returns None if not pending.
pub async fn cancel(pool: &PgPool, id: Uuid, reason: &str) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'cancelled',
            cancelled_at = NOW(),
            cancellation_reason = $2,
            updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(reason)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// pending -> expired, guarded on the deadline actually having passed.
pub async fn expire(pool: &PgPool, id: Uuid) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'expired',
            cancelled_at = NOW(),
            cancellation_reason = 'Hold expired',
            updated_at = NOW()
        WHERE id = $1 AND status = 'pending' AND hold_expires_at < NOW()
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Attach the payment that is charging this booking
pub async fn set_payment(pool: &PgPool, id: Uuid, payment_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE bookings SET payment_id = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(payment_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Push the hold deadline forward after the engine extended the seats
pub async fn extend_hold(
    pool: &PgPool,
    id: Uuid,
    hold_expires_at: DateTime<Utc>,
) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET hold_expires_at = $2,
            updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(hold_expires_at)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

/// Unpaid bookings past their hold deadline (for the reaper)
pub async fn find_expired_pending(pool: &PgPool, before: DateTime<Utc>) -> Result<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE status = 'pending'
          AND hold_expires_at < $1
        ORDER BY hold_expires_at ASC
        "#,
    )
    .bind(before)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}
