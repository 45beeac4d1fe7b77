pub mod cancel;
pub mod extend;
pub mod hold;
pub mod lifecycle;
pub mod utils;

pub use cancel::cancel_booking;
pub use extend::extend_hold;
pub use hold::hold_seats;
pub use lifecycle::{confirm_seats_after_payment, release_seats_after_payment_failure};
pub use utils::generate_booking_code;

use cineseat_db::models::Booking;
use cineseat_db::{queries::bookings, PgPool};
use cineseat_types::{codes, AppError};
use uuid::Uuid;

use crate::db_error;

/// Load a booking, enforcing that the caller owns it.
pub async fn get_booking(pool: &PgPool, booking_id: Uuid, user_id: Uuid) -> Result<Booking, AppError> {
    let booking = bookings::find_by_id(pool, booking_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(codes::BOOKING_NOT_FOUND, format!("Booking {booking_id} not found"))
        })?;

    if booking.user_id != user_id {
        return Err(AppError::Forbidden(
            codes::BOOKING_NOT_OWNED,
            "You can only view your own bookings".into(),
        ));
    }

    Ok(booking)
}
