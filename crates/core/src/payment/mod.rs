//! Payment orchestration.
//!
//! State machine: `pending` → (gateway answered) `processing` → webhook
//! settles `completed` or `failed`. `completed` is terminal; the
//! `status <> 'completed'` guard on the webhook updates makes duplicate
//! deliveries single-effect.
//!
//! The only calls back into the booking side are
//! [`crate::booking::confirm_seats_after_payment`] and
//! [`crate::booking::release_seats_after_payment_failure`].

pub mod create;
pub mod webhook;

pub use create::{create_payment, PaymentCreated};
pub use webhook::handle_webhook;

use cineseat_db::models::Payment;
use cineseat_db::{queries::payments, PgPool};
use cineseat_types::{codes, AppError};
use uuid::Uuid;

use crate::db_error;

/// Load a payment, enforcing that the caller owns it.
pub async fn get_payment(pool: &PgPool, payment_id: Uuid, user_id: Uuid) -> Result<Payment, AppError> {
    let payment = payments::find_by_id(pool, payment_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(codes::PAYMENT_NOT_FOUND, format!("Payment {payment_id} not found"))
        })?;

    if payment.user_id != user_id {
        return Err(AppError::Forbidden(
            codes::PAYMENT_NOT_OWNED,
            "You can only view your own payments".into(),
        ));
    }

    Ok(payment)
}
