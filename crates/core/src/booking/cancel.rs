use cineseat_db::models::Booking;
use cineseat_db::{queries::bookings, PgPool};
use cineseat_engine::SeatEngine;
use cineseat_types::{codes, AppError};
use uuid::Uuid;

use crate::{db_error, engine_error};

/// Cancel a pending booking and return its seats.
///
/// Only the owner may cancel, and only while the booking is still pending;
/// paid bookings go through the refund path instead.
pub async fn cancel_booking(
    pool: &PgPool,
    engine: &SeatEngine,
    booking_id: Uuid,
    user_id: Uuid,
) -> Result<Booking, AppError> {
    let booking = bookings::find_by_id(pool, booking_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(codes::BOOKING_NOT_FOUND, format!("Booking {booking_id} not found"))
        })?;

    if booking.user_id != user_id {
        return Err(AppError::Forbidden(
            codes::BOOKING_NOT_OWNED,
            "You can only cancel your own bookings".into(),
        ));
    }

    if booking.status != "pending" {
        return Err(AppError::PreconditionFailed(
            codes::BOOKING_CANNOT_BE_CANCELLED,
            format!("Booking is {} and cannot be cancelled", booking.status),
        ));
    }

    let seat_ids = booking.seat_ids();
    let outcome = engine
        .release_seats(booking.showtime_id, booking_id, &seat_ids)
        .await
        .map_err(engine_error)?;

    if !outcome.failed.is_empty() {
        // Expired holds already reaped report WRONG_BOOKING here; harmless.
        tracing::debug!(%booking_id, failed = ?outcome.failed, "cancel released a subset of seats");
    }

    let cancelled = bookings::cancel(pool, booking_id, "Cancelled by user")
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::PreconditionFailed(
                codes::BOOKING_CANNOT_BE_CANCELLED,
                "Booking changed state while cancelling".into(),
            )
        })?;

    tracing::info!(
        %booking_id,
        booking_code = %cancelled.booking_code,
        released = outcome.released,
        "booking cancelled by user"
    );

    Ok(cancelled)
}
