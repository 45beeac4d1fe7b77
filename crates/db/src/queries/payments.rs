use crate::models::Payment;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub idempotency_key: String,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub expires_at: DateTime<Utc>,
}

/// Insert a pending payment. The unique index on `idempotency_key` is the
/// race control between concurrent create-payment calls; collisions surface
/// via [`crate::unique_violation`] and the caller reads back the winner.
pub async fn create(pool: &PgPool, new: &NewPayment) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (
            id, booking_id, user_id, idempotency_key,
            amount, currency, payment_method, status, expires_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.booking_id)
    .bind(new.user_id)
    .bind(&new.idempotency_key)
    .bind(new.amount)
    .bind(&new.currency)
    .bind(&new.payment_method)
    .bind(new.expires_at)
    .fetch_one(pool)
    .await?;

    Ok(payment)
}

/// Find payment by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(payment)
}

/// Find payment by the gateway's transaction reference
pub async fn find_by_gateway_transaction_id(
    pool: &PgPool,
    transaction_id: &str,
) -> Result<Option<Payment>> {
    let payment =
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE gateway_transaction_id = $1")
            .bind(transaction_id)
            .fetch_optional(pool)
            .await?;

    Ok(payment)
}

/// Find payment created under this idempotency key
pub async fn find_by_idempotency_key(pool: &PgPool, idempotency_key: &str) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE idempotency_key = $1")
        .bind(idempotency_key)
        .fetch_optional(pool)
        .await?;

    Ok(payment)
}

/// All payments for a booking, newest first
pub async fn find_for_booking(pool: &PgPool, booking_id: Uuid) -> Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE booking_id = $1 ORDER BY created_at DESC",
    )
    .bind(booking_id)
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

/// pending -> processing once the gateway has answered with a checkout
pub async fn mark_processing(
    pool: &PgPool,
    id: Uuid,
    gateway_transaction_id: &str,
    payment_url: &str,
) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = 'processing',
            gateway_transaction_id = $2,
            payment_url = $3,
            attempt_count = attempt_count + 1,
            updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(gateway_transaction_id)
    .bind(payment_url)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}

/// Webhook success path: `status <> 'completed'` is the atomic guard that
/// makes duplicate deliveries single-effect. None means already processed.
pub async fn complete_if_not_completed(
    pool: &PgPool,
    gateway_transaction_id: &str,
    paid_at: DateTime<Utc>,
) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = 'completed',
            paid_at = $2,
            version = version + 1,
            updated_at = NOW()
        WHERE gateway_transaction_id = $1 AND status <> 'completed'
        RETURNING *
        "#,
    )
    .bind(gateway_transaction_id)
    .bind(paid_at)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}

/// Webhook failure path, same guard. None means a completed payment refused
/// the transition (or the webhook was replayed after a failure was recorded).
pub async fn fail_if_not_completed(
    pool: &PgPool,
    gateway_transaction_id: &str,
) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = 'failed',
            version = version + 1,
            updated_at = NOW()
        WHERE gateway_transaction_id = $1 AND status NOT IN ('completed', 'failed')
        RETURNING *
        "#,
    )
    .bind(gateway_transaction_id)
    .fetch_optional(pool)
    .await?;

    Ok(payment)
}
