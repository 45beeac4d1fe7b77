use crate::models::IdempotencyRecord;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Claim the `(key, user)` slot with a processing record. The compound
/// unique index decides races; the loser sees a unique violation and
/// re-reads.
pub async fn insert_processing(
    pool: &PgPool,
    idempotency_key: &str,
    user_id: Uuid,
    request_path: &str,
    request_hash: &str,
    resource_type: &str,
    expires_at: DateTime<Utc>,
) -> Result<IdempotencyRecord> {
    let record = sqlx::query_as::<_, IdempotencyRecord>(
        r#"
        INSERT INTO idempotency_keys (
            id, idempotency_key, user_id, request_path, request_hash,
            resource_type, status, expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'processing', $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(idempotency_key)
    .bind(user_id)
    .bind(request_path)
    .bind(request_hash)
    .bind(resource_type)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub async fn find(
    pool: &PgPool,
    idempotency_key: &str,
    user_id: Uuid,
) -> Result<Option<IdempotencyRecord>> {
    let record = sqlx::query_as::<_, IdempotencyRecord>(
        "SELECT * FROM idempotency_keys WHERE idempotency_key = $1 AND user_id = $2",
    )
    .bind(idempotency_key)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// processing -> completed with the cached response. No-op when the record
/// has already advanced.
pub async fn complete(
    pool: &PgPool,
    idempotency_key: &str,
    user_id: Uuid,
    response_status: i32,
    response_body: &serde_json::Value,
    resource_id: Option<&str>,
) -> Result<Option<IdempotencyRecord>> {
    let record = sqlx::query_as::<_, IdempotencyRecord>(
        r#"
        UPDATE idempotency_keys
        SET status = 'completed',
            response_status = $3,
            response_body = $4,
            resource_id = $5,
            updated_at = NOW()
        WHERE idempotency_key = $1 AND user_id = $2 AND status = 'processing'
        RETURNING *
        "#,
    )
    .bind(idempotency_key)
    .bind(user_id)
    .bind(response_status)
    .bind(response_body)
    .bind(resource_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// processing -> failed with the captured error envelope, so a retry with
/// the same key replays the same failure.
pub async fn fail(
    pool: &PgPool,
    idempotency_key: &str,
    user_id: Uuid,
    response_status: i32,
    response_body: &serde_json::Value,
    error_message: &str,
) -> Result<Option<IdempotencyRecord>> {
    let record = sqlx::query_as::<_, IdempotencyRecord>(
        r#"
        UPDATE idempotency_keys
        SET status = 'failed',
            response_status = $3,
            response_body = $4,
            error_message = $5,
            updated_at = NOW()
        WHERE idempotency_key = $1 AND user_id = $2 AND status = 'processing'
        RETURNING *
        "#,
    )
    .bind(idempotency_key)
    .bind(user_id)
    .bind(response_status)
    .bind(response_body)
    .bind(error_message)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Postgres has no TTL index; the purge job calls this instead.
pub async fn purge_expired(pool: &PgPool, before: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM idempotency_keys WHERE expires_at < $1")
        .bind(before)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
