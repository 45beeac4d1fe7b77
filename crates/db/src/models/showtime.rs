use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Showtime {
    pub id: Uuid,
    pub movie_title: String,
    pub screen_name: String,
    pub starts_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authoritative seat metadata for a showtime; the engine's live state is
/// seeded from these rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShowtimeSeat {
    pub showtime_id: Uuid,
    pub seat_id: String,
    pub seat_type: String,
    /// Price in VND
    pub price: i64,
}
