use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One deduplicated request, unique per `(idempotency_key, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct IdempotencyRecord {
    pub id: Uuid,
    pub idempotency_key: String,
    pub user_id: Uuid,
    pub request_path: String,
    /// SHA-256 over the canonicalized request body
    pub request_hash: String,
    pub resource_type: String,
    pub status: String,
    pub response_status: Option<i32>,
    pub response_body: Option<serde_json::Value>,
    pub resource_id: Option<String>,
    pub error_message: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
