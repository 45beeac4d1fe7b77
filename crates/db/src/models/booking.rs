use chrono::{DateTime, Utc};
use cineseat_types::api::BookingSeat;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub booking_code: String,
    /// Ordered seat lines as priced at hold time
    pub seats: Json<Vec<BookingSeat>>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub currency: String,
    pub status: String,
    pub held_at: DateTime<Utc>,
    pub hold_expires_at: DateTime<Utc>,
    pub idempotency_key: String,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub payment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn seat_ids(&self) -> Vec<String> {
        self.seats.0.iter().map(|s| s.seat_id.clone()).collect()
    }
}
