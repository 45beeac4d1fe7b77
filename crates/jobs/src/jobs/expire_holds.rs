use chrono::Utc;
use cineseat_db::models::Booking;
use cineseat_db::{queries::bookings, PgPool};
use cineseat_engine::SeatEngine;
use tokio::task::JoinSet;

/// Release bookings whose hold deadline has passed without payment.
/// Runs every 1 minute.
///
/// The engine matches seats by booking id, so a reap for booking X can
/// never release seats that were meanwhile re-held by booking Y; several
/// reaper processes stepping on each other is safe.
pub async fn expire_unpaid_holds(
    pool: &PgPool,
    engine: &SeatEngine,
    parallelism: usize,
) -> anyhow::Result<()> {
    let now = Utc::now();

    let expired_bookings = bookings::find_expired_pending(pool, now).await?;

    if expired_bookings.is_empty() {
        return Ok(());
    }

    tracing::info!(
        "Found {} expired unpaid bookings to release",
        expired_bookings.len()
    );

    let mut tasks = JoinSet::new();
    for booking in expired_bookings {
        if tasks.len() >= parallelism.max(1) {
            if let Some(Err(join_err)) = tasks.join_next().await {
                tracing::error!("expiry task panicked: {join_err}");
            }
        }

        let pool = pool.clone();
        let engine = engine.clone();
        tasks.spawn(async move {
            reap_booking(&pool, &engine, booking).await;
        });
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(join_err) = result {
            tracing::error!("expiry task panicked: {join_err}");
        }
    }

    Ok(())
}

async fn reap_booking(pool: &PgPool, engine: &SeatEngine, booking: Booking) {
    tracing::info!(
        "Releasing booking {} (showtime: {}, deadline: {})",
        booking.booking_code,
        booking.showtime_id,
        booking.hold_expires_at
    );

    let seat_ids = booking.seat_ids();

    // Engine first; if the release fails the booking stays pending and the
    // next tick retries it.
    let outcome = match engine
        .release_seats(booking.showtime_id, booking.id, &seat_ids)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(
                "Failed to release seats for booking {}: {}",
                booking.booking_code,
                e
            );
            return;
        }
    };

    match bookings::expire(pool, booking.id).await {
        Ok(Some(_)) => {
            tracing::info!(
                "✓ Expired booking {} - returned {} seats",
                booking.booking_code,
                outcome.released
            );
        }
        Ok(None) => {
            // Paid or cancelled between the scan and now; the release above
            // was already a per-seat no-op for anything it did not own.
            tracing::debug!(
                "Booking {} settled concurrently, nothing to expire",
                booking.booking_code
            );
        }
        Err(e) => {
            tracing::error!(
                "Failed to mark booking {} expired: {}",
                booking.booking_code,
                e
            );
        }
    }
}
