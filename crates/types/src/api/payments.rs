use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::enums::{PaymentProvider, PaymentStatus};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    pub booking_id: Uuid,
    pub payment_method: PaymentProvider,
    #[validate(url)]
    pub return_url: Option<String>,
}

/// Body of `POST /api/bookings/:id/confirm`; the booking id comes from the path.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ConfirmBookingRequest {
    pub payment_method: PaymentProvider,
    #[validate(url)]
    pub return_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentResponse {
    pub payment_id: Uuid,
    pub booking_id: Uuid,
    pub status: PaymentStatus,
    pub amount: i64,
    pub currency: String,
    pub payment_method: PaymentProvider,
    pub payment_url: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub payment_method: PaymentProvider,
    pub status: PaymentStatus,
    pub gateway_transaction_id: Option<String>,
    pub payment_url: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub attempt_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Gateway callback payload, delivered to `POST /api/payments/webhook/:provider`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub transaction_id: String,
    /// "success", "failed" or "pending"
    pub status: String,
    pub amount: i64,
    pub paid_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}
