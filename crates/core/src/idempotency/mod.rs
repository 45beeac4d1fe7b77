//! Request-level deduplication.
//!
//! Every mutating endpoint that takes an `X-Idempotency-Key` runs through
//! [`begin`] before doing work and [`complete`] / [`fail`] after. The
//! compound unique index on `(idempotency_key, user_id)` resolves races
//! between concurrent retries; everything else is plain conditional updates.

pub mod hash;

pub use hash::{canonical_json, request_hash};

use chrono::{Duration, Utc};
use cineseat_db::{queries::idempotency, unique_violation, PgPool};
use cineseat_types::enums::{IdempotencyStatus, ResourceType};
use cineseat_types::validation::MAX_IDEMPOTENCY_KEY_LEN;
use cineseat_types::{codes, AppError};
use serde_json::Value;
use uuid::Uuid;

use crate::db_error;

/// Result of an idempotent operation: executed now, or replayed from the
/// cached response of an earlier attempt with the same key.
#[derive(Debug, Clone)]
pub enum Idempotent<T> {
    Fresh(T),
    Replayed { status_code: u16, body: Value },
}

/// What [`begin`] decided about this `(key, user)` pair.
#[derive(Debug, Clone)]
pub enum Begin {
    /// A processing record was created; the caller owns the work now.
    New,
    /// A finished attempt exists; its response must be returned verbatim.
    Replay { status_code: u16, body: Value },
}

/// Claim or inspect the idempotency slot for this request.
///
/// Same key + same body hash: replay the stored response (success or
/// failure alike). Same key + different hash: `KEY_REUSED_DIFFERENT_BODY`.
/// Same key still processing: `REQUEST_IN_FLIGHT`.
pub async fn begin(
    pool: &PgPool,
    idempotency_key: &str,
    user_id: Uuid,
    request_path: &str,
    body: &Value,
    resource_type: ResourceType,
    ttl_secs: i64,
) -> Result<Begin, AppError> {
    if idempotency_key.is_empty() || idempotency_key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::Validation(
            codes::INVALID_IDEMPOTENCY_KEY,
            format!("Idempotency key must be 1-{MAX_IDEMPOTENCY_KEY_LEN} characters"),
        ));
    }

    let hash = request_hash(body);
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);

    // Two passes: read, then insert; an insert race loops back into one
    // more read of whatever the winner wrote.
    for _ in 0..2 {
        if let Some(record) = idempotency::find(pool, idempotency_key, user_id)
            .await
            .map_err(db_error)?
        {
            if record.request_hash != hash {
                return Err(AppError::Validation(
                    codes::KEY_REUSED_DIFFERENT_BODY,
                    "Idempotency key was already used with a different request body".into(),
                ));
            }

            let status: IdempotencyStatus = record.status.parse().unwrap_or_default();
            return match status {
                IdempotencyStatus::Processing => Err(AppError::Conflict(
                    codes::REQUEST_IN_FLIGHT,
                    "A request with this idempotency key is still in flight".into(),
                )),
                IdempotencyStatus::Completed | IdempotencyStatus::Failed => Ok(Begin::Replay {
                    status_code: record.response_status.unwrap_or(200) as u16,
                    body: record.response_body.unwrap_or(Value::Null),
                }),
            };
        }

        match idempotency::insert_processing(
            pool,
            idempotency_key,
            user_id,
            request_path,
            &hash,
            resource_type.as_str(),
            expires_at,
        )
        .await
        {
            Ok(_) => return Ok(Begin::New),
            Err(err) if unique_violation(&err).is_some() => {
                tracing::debug!(%user_id, idempotency_key, "lost idempotency insert race, re-reading");
                continue;
            }
            Err(err) => return Err(db_error(err)),
        }
    }

    Err(AppError::Conflict(
        codes::REQUEST_IN_FLIGHT,
        "Could not claim the idempotency slot".into(),
    ))
}

/// Store the successful response. Best-effort: a record that already
/// advanced is left alone.
pub async fn complete(
    pool: &PgPool,
    idempotency_key: &str,
    user_id: Uuid,
    status_code: u16,
    body: &Value,
    resource_id: Option<&str>,
) {
    match idempotency::complete(pool, idempotency_key, user_id, status_code as i32, body, resource_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(%user_id, idempotency_key, "idempotency record already advanced, complete was a no-op");
        }
        Err(err) => {
            tracing::error!(%user_id, idempotency_key, error = %err, "failed to complete idempotency record");
        }
    }
}

/// Store the failure envelope so retries with the same key replay it.
pub async fn fail(pool: &PgPool, idempotency_key: &str, user_id: Uuid, err: &AppError) {
    let envelope = err.to_envelope();
    match idempotency::fail(
        pool,
        idempotency_key,
        user_id,
        err.status_code() as i32,
        &envelope,
        &err.to_string(),
    )
    .await
    {
        Ok(_) => {}
        Err(store_err) => {
            tracing::error!(%user_id, idempotency_key, error = %store_err, "failed to record idempotency failure");
        }
    }
}
