pub mod bookings;
pub mod payments;
pub mod seats;

pub use bookings::*;
pub use payments::*;
pub use seats::*;
