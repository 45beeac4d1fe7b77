//! Showtime live-state management.
//!
//! The durable `showtime_seats` table is the authoritative seat layout; the
//! engine holds the live copy. Live state is seeded lazily on first touch
//! (and re-seeded after TTL eviction) so cold showtimes cost nothing.

use cineseat_db::models::ShowtimeSeat;
use cineseat_db::{queries::showtimes, PgPool};
use cineseat_engine::{SeatEngine, SeatSpec};
use cineseat_types::api::{SeatStatusEntry, ShowtimeSeatsResponse};
use cineseat_types::{codes, AppConfig, AppError};
use uuid::Uuid;

use crate::{db_error, engine_error};

/// Load the seat table, failing NOT_FOUND on an empty layout.
pub async fn load_seat_table(pool: &PgPool, showtime_id: Uuid) -> Result<Vec<ShowtimeSeat>, AppError> {
    let seats = showtimes::list_seats(pool, showtime_id)
        .await
        .map_err(db_error)?;

    if seats.is_empty() {
        return Err(AppError::NotFound(
            codes::SHOWTIME_NOT_FOUND,
            format!("Showtime {showtime_id} has no seat layout"),
        ));
    }

    Ok(seats)
}

/// Make sure the engine carries live state for this showtime, seeding it
/// from the durable layout if the keys are missing or evicted.
pub async fn ensure_live_state(
    pool: &PgPool,
    engine: &SeatEngine,
    config: &AppConfig,
    showtime_id: Uuid,
) -> Result<(), AppError> {
    if engine
        .is_initialized(showtime_id)
        .await
        .map_err(engine_error)?
    {
        return Ok(());
    }

    let seats = load_seat_table(pool, showtime_id).await?;
    let specs: Vec<SeatSpec> = seats
        .iter()
        .map(|s| SeatSpec {
            seat_id: s.seat_id.clone(),
            seat_type: s.seat_type.clone(),
        })
        .collect();

    engine
        .initialize_showtime(showtime_id, &specs, config.showtime_kv_ttl_secs)
        .await
        .map_err(engine_error)
}

/// Live seat map for a showtime. Reading through the engine lazily reaps
/// expired holds, so the response never shows a stale hold.
pub async fn seats_status(
    pool: &PgPool,
    engine: &SeatEngine,
    config: &AppConfig,
    showtime_id: Uuid,
) -> Result<ShowtimeSeatsResponse, AppError> {
    let showtime = showtimes::find_by_id(pool, showtime_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(
                codes::SHOWTIME_NOT_FOUND,
                format!("Showtime {showtime_id} not found"),
            )
        })?;

    ensure_live_state(pool, engine, config, showtime.id).await?;

    let outcome = engine
        .get_seats_status(showtime_id, &[])
        .await
        .map_err(engine_error)?;

    let seats = outcome
        .seats
        .into_iter()
        .map(|s| SeatStatusEntry {
            seat_id: s.seat_id,
            status: s.status.parse().unwrap_or_default(),
            seat_type: s.seat_type.parse().unwrap_or_default(),
            booking_id: s.booking_id.and_then(|id| id.parse().ok()),
            remaining_seconds: s.remaining_seconds,
        })
        .collect();

    Ok(ShowtimeSeatsResponse {
        showtime_id,
        available: outcome.available,
        seats,
    })
}
