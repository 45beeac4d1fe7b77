use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{SeatStatus, SeatType};

/// Live state of one seat as reported by the reservation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatStatusEntry {
    pub seat_id: String,
    pub status: SeatStatus,
    pub seat_type: SeatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    /// Seconds until the hold lapses; only present while held
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowtimeSeatsResponse {
    pub showtime_id: Uuid,
    /// Count of seats currently available, from the engine's counter
    pub available: i64,
    pub seats: Vec<SeatStatusEntry>,
}
