use chrono::Utc;
use cineseat_db::{queries::idempotency, PgPool};

/// Delete idempotency records past their 24h expiry.
/// Runs daily at 03:00 (Postgres has no TTL index to do this for us).
pub async fn purge_idempotency_keys(pool: &PgPool) -> anyhow::Result<()> {
    let purged = idempotency::purge_expired(pool, Utc::now()).await?;

    if purged > 0 {
        tracing::info!("✓ Purged {} expired idempotency records", purged);
    }

    Ok(())
}
