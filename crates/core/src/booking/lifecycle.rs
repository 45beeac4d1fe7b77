//! Post-payment transitions, driven by the webhook reconciler.
//!
//! These two functions are the only surface the payment side uses from the
//! booking side.

use cineseat_db::{queries::bookings, PgPool};
use cineseat_engine::SeatEngine;
use cineseat_types::AppError;
use uuid::Uuid;

use crate::{db_error, engine_error};

/// Move a paid booking's seats from held to booked.
///
/// Returns true when every seat confirmed and the booking is now
/// `confirmed`. A partial confirmation leaves the booking `pending` and is
/// logged for operator resolution; seats confirmed in the same call stay
/// booked (an administrative release resolves the remainder).
pub async fn confirm_seats_after_payment(
    pool: &PgPool,
    engine: &SeatEngine,
    booking_id: Uuid,
) -> Result<bool, AppError> {
    let Some(booking) = bookings::find_by_id(pool, booking_id).await.map_err(db_error)? else {
        tracing::warn!(%booking_id, "confirm-after-payment for unknown booking");
        return Ok(false);
    };

    let seat_ids = booking.seat_ids();
    let outcome = engine
        .confirm_seats(booking.showtime_id, booking_id, &seat_ids)
        .await
        .map_err(engine_error)?;

    if !outcome.is_full() {
        tracing::error!(
            %booking_id,
            booking_code = %booking.booking_code,
            confirmed = outcome.confirmed.len(),
            failed = ?outcome.failed,
            "partial seat confirmation after payment; booking left pending"
        );
        return Ok(false);
    }

    match bookings::confirm(pool, booking_id).await.map_err(db_error)? {
        Some(confirmed) => {
            tracing::info!(
                %booking_id,
                booking_code = %confirmed.booking_code,
                seats = seat_ids.len(),
                "booking confirmed after payment"
            );
        }
        None => {
            // Already confirmed by an earlier delivery; the engine call above
            // was a no-op on booked seats owned by this booking.
            tracing::debug!(%booking_id, "booking was not pending, confirm skipped");
        }
    }

    Ok(true)
}

/// Return a booking's seats to the pool after the gateway reported failure.
pub async fn release_seats_after_payment_failure(
    pool: &PgPool,
    engine: &SeatEngine,
    booking_id: Uuid,
) -> Result<(), AppError> {
    let Some(booking) = bookings::find_by_id(pool, booking_id).await.map_err(db_error)? else {
        tracing::warn!(%booking_id, "release-after-failure for unknown booking");
        return Ok(());
    };

    let seat_ids = booking.seat_ids();
    let outcome = engine
        .release_seats(booking.showtime_id, booking_id, &seat_ids)
        .await
        .map_err(engine_error)?;

    if !outcome.failed.is_empty() {
        tracing::warn!(
            %booking_id,
            failed = ?outcome.failed,
            "some seats were not released (already returned or re-held)"
        );
    }

    if bookings::cancel(pool, booking_id, "Payment failed")
        .await
        .map_err(db_error)?
        .is_some()
    {
        tracing::info!(
            %booking_id,
            booking_code = %booking.booking_code,
            released = outcome.released,
            "booking cancelled after payment failure"
        );
    }

    Ok(())
}
