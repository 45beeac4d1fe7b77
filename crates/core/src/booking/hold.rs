//! The hold path: engine first, durable record second, compensate on
//! failure in between.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use cineseat_db::models::{showtime_statuses, Booking, ShowtimeSeat};
use cineseat_db::queries::bookings::{self, NewBooking};
use cineseat_db::queries::showtimes;
use cineseat_db::{unique_violation, PgPool};
use cineseat_engine::{SeatEngine, SeatSpec};
use cineseat_types::api::{BookingSeat, HoldSeatsRequest, HoldSeatsResponse};
use cineseat_types::enums::ResourceType;
use cineseat_types::{codes, validate_seat_id, AppConfig, AppError};
use uuid::Uuid;

use super::utils::generate_booking_code;
use crate::idempotency::{self, Begin, Idempotent};
use crate::{db_error, engine_error, showtime};

const BOOKING_CODE_ATTEMPTS: usize = 3;

/// Hold seats for a user under an idempotency key.
///
/// Once `batch_reserve` succeeds the function either persists the booking or
/// releases the seats before returning; a hold is never left orphaned by a
/// failure on this path (a crash in between is reclaimed by the reaper).
pub async fn hold_seats(
    pool: &PgPool,
    engine: &SeatEngine,
    config: &AppConfig,
    user_id: Uuid,
    idempotency_key: &str,
    req: &HoldSeatsRequest,
) -> Result<Idempotent<HoldSeatsResponse>, AppError> {
    let body = serde_json::to_value(req).map_err(|e| AppError::internal(e.to_string()))?;

    match idempotency::begin(
        pool,
        idempotency_key,
        user_id,
        "/bookings/hold",
        &body,
        ResourceType::Booking,
        config.idempotency_ttl_secs,
    )
    .await?
    {
        Begin::Replay { status_code, body } => {
            return Ok(Idempotent::Replayed { status_code, body })
        }
        Begin::New => {}
    }

    // A durable booking under this key can outlive its purged idempotency
    // record; rebuild the response instead of holding twice.
    if let Some(existing) = bookings::find_by_idempotency_key(pool, user_id, idempotency_key)
        .await
        .map_err(db_error)?
    {
        let response: HoldSeatsResponse = existing.into();
        finish_completed(pool, idempotency_key, user_id, &response).await;
        return Ok(Idempotent::Fresh(response));
    }

    match hold_seats_fresh(pool, engine, config, user_id, idempotency_key, req).await {
        Ok(response) => {
            finish_completed(pool, idempotency_key, user_id, &response).await;
            Ok(Idempotent::Fresh(response))
        }
        Err(err) => {
            idempotency::fail(pool, idempotency_key, user_id, &err).await;
            Err(err)
        }
    }
}

async fn hold_seats_fresh(
    pool: &PgPool,
    engine: &SeatEngine,
    config: &AppConfig,
    user_id: Uuid,
    idempotency_key: &str,
    req: &HoldSeatsRequest,
) -> Result<HoldSeatsResponse, AppError> {
    if req.seats.is_empty() || req.seats.len() > config.max_seats_per_booking {
        return Err(AppError::Validation(
            codes::INVALID_INPUT,
            format!(
                "A booking must hold between 1 and {} seats",
                config.max_seats_per_booking
            ),
        ));
    }

    let mut seen = HashSet::new();
    for seat_id in &req.seats {
        validate_seat_id(seat_id).map_err(|msg| AppError::Validation(codes::INVALID_SEAT, msg))?;
        if !seen.insert(seat_id.as_str()) {
            return Err(AppError::Validation(
                codes::INVALID_INPUT,
                format!("Seat {seat_id} is listed twice"),
            ));
        }
    }

    let st = showtimes::find_by_id(pool, req.showtime_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(
                codes::SHOWTIME_NOT_FOUND,
                format!("Showtime {} not found", req.showtime_id),
            )
        })?;

    if st.status != showtime_statuses::SCHEDULED {
        return Err(AppError::PreconditionFailed(
            codes::SHOWTIME_NOT_AVAILABLE,
            format!("Showtime is {}", st.status),
        ));
    }

    if st.starts_at <= Utc::now() {
        return Err(AppError::PreconditionFailed(
            codes::SHOWTIME_ALREADY_STARTED,
            "Showtime has already started".into(),
        ));
    }

    // Resolve seat type and price against the authoritative layout.
    let seat_table = showtime::load_seat_table(pool, st.id).await?;
    let by_id: HashMap<&str, &ShowtimeSeat> =
        seat_table.iter().map(|s| (s.seat_id.as_str(), s)).collect();

    let mut seats = Vec::with_capacity(req.seats.len());
    let mut specs = Vec::with_capacity(req.seats.len());
    for seat_id in &req.seats {
        let meta = by_id.get(seat_id.as_str()).ok_or_else(|| {
            AppError::Validation(
                codes::INVALID_SEAT,
                format!("Seat {seat_id} does not exist in this showtime"),
            )
        })?;
        seats.push(BookingSeat {
            seat_id: seat_id.clone(),
            seat_type: meta.seat_type.parse().unwrap_or_default(),
            price: meta.price,
        });
        specs.push(SeatSpec {
            seat_id: seat_id.clone(),
            seat_type: meta.seat_type.clone(),
        });
    }

    showtime::ensure_live_state(pool, engine, config, st.id).await?;

    let booking_id = Uuid::new_v4();
    let outcome = engine
        .batch_reserve(st.id, booking_id, config.hold_duration_secs, &specs)
        .await
        .map_err(engine_error)?;

    if !outcome.success {
        let detail: Vec<String> = outcome
            .unavailable
            .iter()
            .map(|s| format!("{} ({})", s.seat_id, s.reason))
            .collect();
        return Err(AppError::Conflict(
            codes::SEATS_NOT_AVAILABLE,
            format!("Seats not available: {}", detail.join(", ")),
        ));
    }

    let held_at = Utc::now();
    let hold_expires_at = DateTime::<Utc>::from_timestamp(outcome.expires_at, 0)
        .unwrap_or(held_at + Duration::seconds(config.hold_duration_secs));

    let total_amount: i64 = seats.iter().map(|s| s.price).sum();
    let seat_ids = req.seats.clone();

    // Engine succeeded; from here every failure path must release the hold.
    for attempt in 0..BOOKING_CODE_ATTEMPTS {
        let new = NewBooking {
            id: booking_id,
            user_id,
            showtime_id: st.id,
            booking_code: generate_booking_code(),
            seats: seats.clone(),
            total_amount,
            discount_amount: 0,
            final_amount: total_amount,
            currency: "VND".into(),
            held_at,
            hold_expires_at,
            idempotency_key: idempotency_key.to_string(),
        };

        match bookings::create(pool, &new).await {
            Ok(booking) => return Ok(booking.into()),
            Err(err) => match unique_violation(&err).as_deref() {
                Some("bookings_booking_code_key") if attempt + 1 < BOOKING_CODE_ATTEMPTS => {
                    tracing::warn!(%booking_id, "booking code collision, regenerating");
                    continue;
                }
                Some("bookings_idempotency_key_key") => {
                    // Another process persisted under this key first; ours
                    // loses and its hold is returned to the pool.
                    compensate_release(engine, st.id, booking_id, &seat_ids).await;
                    return rebuild_from_existing(pool, user_id, idempotency_key).await;
                }
                _ => {
                    tracing::error!(%booking_id, error = %err, "booking persist failed, releasing held seats");
                    compensate_release(engine, st.id, booking_id, &seat_ids).await;
                    return Err(AppError::Internal(
                        codes::BOOKING_PERSIST_FAILED,
                        "Could not persist the booking".into(),
                    ));
                }
            },
        }
    }

    compensate_release(engine, st.id, booking_id, &seat_ids).await;
    Err(AppError::Internal(
        codes::BOOKING_PERSIST_FAILED,
        "Could not allocate a unique booking code".into(),
    ))
}

async fn rebuild_from_existing(
    pool: &PgPool,
    user_id: Uuid,
    idempotency_key: &str,
) -> Result<HoldSeatsResponse, AppError> {
    let existing: Option<Booking> = bookings::find_by_idempotency_key(pool, user_id, idempotency_key)
        .await
        .map_err(db_error)?;

    existing.map(Into::into).ok_or_else(|| {
        AppError::Internal(
            codes::BOOKING_PERSIST_FAILED,
            "Booking vanished after idempotency collision".into(),
        )
    })
}

/// Best-effort release after a failed persist. If Redis is down too, the
/// hold simply runs out: lazy reap or the expiry reaper reclaims it.
async fn compensate_release(
    engine: &SeatEngine,
    showtime_id: Uuid,
    booking_id: Uuid,
    seat_ids: &[String],
) {
    if let Err(err) = engine.release_seats(showtime_id, booking_id, seat_ids).await {
        tracing::error!(
            %showtime_id,
            %booking_id,
            error = %err,
            "compensating release failed; hold will lapse on its own"
        );
    }
}

async fn finish_completed(
    pool: &PgPool,
    idempotency_key: &str,
    user_id: Uuid,
    response: &HoldSeatsResponse,
) {
    match serde_json::to_value(response) {
        Ok(body) => {
            idempotency::complete(
                pool,
                idempotency_key,
                user_id,
                201,
                &body,
                Some(&response.booking_id.to_string()),
            )
            .await;
        }
        Err(err) => {
            tracing::error!(error = %err, "could not serialize hold response for idempotency cache");
        }
    }
}
