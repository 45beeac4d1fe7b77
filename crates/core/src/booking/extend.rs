use chrono::{DateTime, Utc};
use cineseat_db::{queries::bookings, PgPool};
use cineseat_engine::SeatEngine;
use cineseat_types::api::ExtendHoldResponse;
use cineseat_types::{codes, AppError};
use uuid::Uuid;

use crate::{db_error, engine_error};

/// Push a pending booking's hold deadline forward.
///
/// The engine refuses to revive lapsed holds, so an expired booking cannot
/// be brought back this way.
pub async fn extend_hold(
    pool: &PgPool,
    engine: &SeatEngine,
    booking_id: Uuid,
    user_id: Uuid,
    additional_seconds: i64,
) -> Result<ExtendHoldResponse, AppError> {
    let booking = bookings::find_by_id(pool, booking_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(codes::BOOKING_NOT_FOUND, format!("Booking {booking_id} not found"))
        })?;

    if booking.user_id != user_id {
        return Err(AppError::Forbidden(
            codes::BOOKING_NOT_OWNED,
            "You can only extend your own bookings".into(),
        ));
    }

    if booking.status != "pending" {
        return Err(AppError::PreconditionFailed(
            codes::BOOKING_NOT_PENDING,
            format!("Booking is {}", booking.status),
        ));
    }

    if booking.hold_expires_at <= Utc::now() {
        return Err(AppError::PreconditionFailed(
            codes::BOOKING_HOLD_EXPIRED,
            "The hold has already expired".into(),
        ));
    }

    let seat_ids = booking.seat_ids();
    let outcome = engine
        .extend_hold(booking.showtime_id, booking_id, &seat_ids, additional_seconds)
        .await
        .map_err(engine_error)?;

    if outcome.extended == 0 {
        return Err(AppError::PreconditionFailed(
            codes::BOOKING_HOLD_EXPIRED,
            "No live holds left to extend".into(),
        ));
    }

    let hold_expires_at = outcome
        .expires_at
        .and_then(|epoch| DateTime::<Utc>::from_timestamp(epoch, 0))
        .unwrap_or(booking.hold_expires_at);

    let updated = bookings::extend_hold(pool, booking_id, hold_expires_at)
        .await
        .map_err(db_error)?;

    if updated.is_none() {
        tracing::warn!(%booking_id, "booking left pending state while extending its hold");
    }

    Ok(ExtendHoldResponse {
        booking_id,
        extended_seats: outcome.extended,
        hold_expires_at,
    })
}
