//! Seat reservation operations.
//!
//! Retry discipline is the caller's job and depends on idempotence:
//! `batch_reserve` is NOT safe to retry blindly (a split response could
//! reserve twice under two booking ids); `confirm`, `release`, `cleanup`
//! and `extend` are idempotent over `(booking_id, seat_id)`.

use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::runtime::ScriptRuntime;
use crate::scripts;

/// Seat identity + type, as declared by the showtime's seat table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatSpec {
    pub seat_id: String,
    pub seat_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeatFailure {
    pub seat_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReserveOutcome {
    pub success: bool,
    #[serde(default)]
    pub reserved: u32,
    /// Epoch seconds on the store clock; only meaningful when `success`
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default)]
    pub unavailable: Vec<SeatFailure>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmOutcome {
    pub requested: u32,
    #[serde(default)]
    pub confirmed: Vec<String>,
    #[serde(default)]
    pub failed: Vec<SeatFailure>,
}

impl ConfirmOutcome {
    /// All requested seats moved to `booked` in this call.
    pub fn is_full(&self) -> bool {
        self.failed.is_empty() && self.confirmed.len() as u32 == self.requested
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseOutcome {
    pub released: u32,
    #[serde(default)]
    pub failed: Vec<SeatFailure>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupOutcome {
    pub cleaned: u32,
    #[serde(default)]
    pub seats: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeatSnapshot {
    pub seat_id: String,
    pub status: String,
    pub seat_type: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub remaining_seconds: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusOutcome {
    pub available: i64,
    #[serde(default)]
    pub seats: Vec<SeatSnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtendOutcome {
    pub extended: u32,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Clone)]
pub struct SeatEngine {
    runtime: ScriptRuntime,
}

impl SeatEngine {
    /// Connect to Redis and load every engine script.
    pub async fn connect(redis_url: &str) -> Result<Self, EngineError> {
        let runtime = ScriptRuntime::connect(redis_url, scripts::ALL).await?;
        Ok(Self { runtime })
    }

    pub fn seats_key(showtime_id: Uuid) -> String {
        format!("seats:{showtime_id}")
    }

    pub fn available_key(showtime_id: Uuid) -> String {
        format!("available:{showtime_id}")
    }

    /// Whether this showtime has live seat state (false after TTL eviction).
    pub async fn is_initialized(&self, showtime_id: Uuid) -> Result<bool, EngineError> {
        let mut conn = self.runtime.connection();
        let exists: bool = conn.exists(Self::seats_key(showtime_id)).await?;
        Ok(exists)
    }

    /// Seed the seat map and counter for a showtime in one atomic pipeline.
    /// NX writes make a concurrent second initialization a no-op rather than
    /// a wipe of live holds. Both keys get `ttl_secs` so cold showtimes evict
    /// on their own.
    pub async fn initialize_showtime(
        &self,
        showtime_id: Uuid,
        seats: &[SeatSpec],
        ttl_secs: i64,
    ) -> Result<(), EngineError> {
        if seats.is_empty() {
            return Err(EngineError::InvalidInput("seat list is empty".into()));
        }

        let seats_key = Self::seats_key(showtime_id);
        let available_key = Self::available_key(showtime_id);

        let mut pipe = redis::pipe();
        pipe.atomic();
        for seat in seats {
            let record = serde_json::json!({
                "status": "available",
                "seat_type": seat.seat_type,
            });
            pipe.hset_nx(&seats_key, &seat.seat_id, record.to_string())
                .ignore();
        }
        pipe.set_nx(&available_key, seats.len()).ignore();
        pipe.expire(&seats_key, ttl_secs).ignore();
        pipe.expire(&available_key, ttl_secs).ignore();

        let mut conn = self.runtime.connection();
        let _: () = pipe.query_async(&mut conn).await?;

        tracing::info!(%showtime_id, seats = seats.len(), "initialized showtime seat map");
        Ok(())
    }

    /// All-or-nothing hold of `seats` for `booking_id`. The hold deadline is
    /// `store_now + hold_seconds`, computed inside the script.
    pub async fn batch_reserve(
        &self,
        showtime_id: Uuid,
        booking_id: Uuid,
        hold_seconds: i64,
        seats: &[SeatSpec],
    ) -> Result<ReserveOutcome, EngineError> {
        if seats.is_empty() {
            return Err(EngineError::InvalidInput("seat list is empty".into()));
        }
        if hold_seconds <= 0 {
            return Err(EngineError::InvalidInput(format!(
                "hold duration must be positive, got {hold_seconds}"
            )));
        }

        let keys = vec![Self::seats_key(showtime_id), Self::available_key(showtime_id)];
        let mut argv = vec![booking_id.to_string(), hold_seconds.to_string()];
        for seat in seats {
            argv.push(seat.seat_id.clone());
            argv.push(seat.seat_type.clone());
        }

        self.runtime
            .eval_json(&scripts::BATCH_RESERVE, &keys, &argv)
            .await
    }

    pub async fn confirm_seats(
        &self,
        showtime_id: Uuid,
        booking_id: Uuid,
        seat_ids: &[String],
    ) -> Result<ConfirmOutcome, EngineError> {
        if seat_ids.is_empty() {
            return Err(EngineError::InvalidInput("seat list is empty".into()));
        }

        let keys = vec![Self::seats_key(showtime_id)];
        let mut argv = vec![booking_id.to_string()];
        argv.extend(seat_ids.iter().cloned());

        self.runtime
            .eval_json(&scripts::CONFIRM_SEATS, &keys, &argv)
            .await
    }

    pub async fn release_seats(
        &self,
        showtime_id: Uuid,
        booking_id: Uuid,
        seat_ids: &[String],
    ) -> Result<ReleaseOutcome, EngineError> {
        if seat_ids.is_empty() {
            return Err(EngineError::InvalidInput("seat list is empty".into()));
        }

        let keys = vec![Self::seats_key(showtime_id), Self::available_key(showtime_id)];
        let mut argv = vec![booking_id.to_string()];
        argv.extend(seat_ids.iter().cloned());

        self.runtime
            .eval_json(&scripts::RELEASE_SEATS, &keys, &argv)
            .await
    }

    pub async fn cleanup_expired_holds(
        &self,
        showtime_id: Uuid,
    ) -> Result<CleanupOutcome, EngineError> {
        let keys = vec![Self::seats_key(showtime_id), Self::available_key(showtime_id)];
        self.runtime
            .eval_json(&scripts::CLEANUP_EXPIRED, &keys, &[])
            .await
    }

    /// Read seat state, lazily reaping expired holds as a side effect.
    /// `seat_ids` empty means the whole map.
    pub async fn get_seats_status(
        &self,
        showtime_id: Uuid,
        seat_ids: &[String],
    ) -> Result<StatusOutcome, EngineError> {
        let keys = vec![Self::seats_key(showtime_id), Self::available_key(showtime_id)];
        self.runtime
            .eval_json(&scripts::SEATS_STATUS, &keys, seat_ids)
            .await
    }

    pub async fn extend_hold(
        &self,
        showtime_id: Uuid,
        booking_id: Uuid,
        seat_ids: &[String],
        additional_seconds: i64,
    ) -> Result<ExtendOutcome, EngineError> {
        if seat_ids.is_empty() {
            return Err(EngineError::InvalidInput("seat list is empty".into()));
        }
        if additional_seconds <= 0 {
            return Err(EngineError::InvalidInput(format!(
                "extension must be positive, got {additional_seconds}"
            )));
        }

        let keys = vec![Self::seats_key(showtime_id)];
        let mut argv = vec![booking_id.to_string(), additional_seconds.to_string()];
        argv.extend(seat_ids.iter().cloned());

        self.runtime
            .eval_json(&scripts::EXTEND_HOLD, &keys, &argv)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            SeatEngine::seats_key(id),
            "seats:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            SeatEngine::available_key(id),
            "available:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_parse_reserve_success() {
        let raw = r#"{"success":true,"reserved":2,"expires_at":1735000600}"#;
        let outcome: ReserveOutcome = serde_json::from_str(raw).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.reserved, 2);
        assert_eq!(outcome.expires_at, 1_735_000_600);
        assert!(outcome.unavailable.is_empty());
    }

    #[test]
    fn test_parse_reserve_conflict() {
        let raw = r#"{"success":false,"unavailable":[{"seat_id":"A1","reason":"HELD"},{"seat_id":"A2","reason":"BOOKED"}]}"#;
        let outcome: ReserveOutcome = serde_json::from_str(raw).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.unavailable.len(), 2);
        assert_eq!(outcome.unavailable[0].reason, "HELD");
    }

    #[test]
    fn test_parse_partial_confirm() {
        let raw = r#"{"requested":3,"confirmed":["A1","A2"],"failed":[{"seat_id":"A3","reason":"HOLD_EXPIRED"}]}"#;
        let outcome: ConfirmOutcome = serde_json::from_str(raw).unwrap();
        assert!(!outcome.is_full());
        assert_eq!(outcome.confirmed.len(), 2);
        assert_eq!(outcome.failed[0].reason, "HOLD_EXPIRED");
    }

    #[test]
    fn test_parse_full_confirm() {
        let raw = r#"{"requested":2,"confirmed":["A1","A2"]}"#;
        let outcome: ConfirmOutcome = serde_json::from_str(raw).unwrap();
        assert!(outcome.is_full());
    }

    #[test]
    fn test_parse_status_without_seats_field() {
        // empty map: the script omits the list entirely
        let raw = r#"{"available":0}"#;
        let outcome: StatusOutcome = serde_json::from_str(raw).unwrap();
        assert_eq!(outcome.available, 0);
        assert!(outcome.seats.is_empty());
    }

    #[test]
    fn test_parse_status_with_held_seat() {
        let raw = r#"{"available":99,"seats":[{"seat_id":"B7","status":"held","seat_type":"vip","booking_id":"6f8f57d5-0b0a-4b0e-9c1a-000000000000","remaining_seconds":314}]}"#;
        let outcome: StatusOutcome = serde_json::from_str(raw).unwrap();
        let seat = &outcome.seats[0];
        assert_eq!(seat.status, "held");
        assert_eq!(seat.remaining_seconds, Some(314));
        assert!(seat.booking_id.is_some());
    }

    #[test]
    fn test_parse_cleanup_and_extend() {
        let cleanup: CleanupOutcome =
            serde_json::from_str(r#"{"cleaned":1,"seats":["C3"]}"#).unwrap();
        assert_eq!(cleanup.cleaned, 1);
        assert_eq!(cleanup.seats, vec!["C3"]);

        let extend: ExtendOutcome =
            serde_json::from_str(r#"{"extended":2,"expires_at":1735001200}"#).unwrap();
        assert_eq!(extend.extended, 2);
        assert_eq!(extend.expires_at, Some(1_735_001_200));

        let none_extended: ExtendOutcome = serde_json::from_str(r#"{"extended":0}"#).unwrap();
        assert_eq!(none_extended.expires_at, None);
    }
}
