pub mod bookings;
pub mod idempotency;
pub mod payments;
pub mod showtimes;
