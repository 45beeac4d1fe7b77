use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::enums::{BookingStatus, SeatType};

/// A single seat line inside a booking, priced from the showtime's seat table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSeat {
    pub seat_id: String,
    pub seat_type: SeatType,
    /// Price in VND
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct HoldSeatsRequest {
    pub showtime_id: Uuid,
    #[validate(length(min = 1, max = 10))]
    pub seats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldSeatsResponse {
    pub booking_id: Uuid,
    pub booking_code: String,
    pub showtime_id: Uuid,
    pub status: BookingStatus,
    pub seats: Vec<BookingSeat>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub currency: String,
    pub held_at: DateTime<Utc>,
    pub hold_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub booking_code: String,
    pub seats: Vec<BookingSeat>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub currency: String,
    pub status: BookingStatus,
    pub held_at: DateTime<Utc>,
    pub hold_expires_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub payment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelBookingResponse {
    pub booking_id: Uuid,
    pub booking_code: String,
    pub status: BookingStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ExtendHoldRequest {
    /// How many seconds to push the hold deadline forward
    #[validate(range(min = 1, max = 1800))]
    pub additional_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendHoldResponse {
    pub booking_id: Uuid,
    pub extended_seats: u32,
    pub hold_expires_at: DateTime<Utc>,
}
