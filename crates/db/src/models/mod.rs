pub mod booking;
pub mod idempotency;
pub mod payment;
pub mod showtime;

pub use booking::Booking;
pub use idempotency::IdempotencyRecord;
pub use payment::Payment;
pub use showtime::{Showtime, ShowtimeSeat};

/// Showtime statuses a hold is allowed against
pub mod showtime_statuses {
    pub const SCHEDULED: &str = "scheduled";
    pub const CANCELLED: &str = "cancelled";
    pub const COMPLETED: &str = "completed";
}
