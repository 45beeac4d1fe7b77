use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub idempotency_key: String,
    /// Amount in VND
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub status: String,
    pub gateway_transaction_id: Option<String>,
    pub payment_url: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub attempt_count: i32,
    /// Bumped by every webhook-driven transition
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_live(&self) -> bool {
        self.status == "pending" || self.status == "processing"
    }
}
