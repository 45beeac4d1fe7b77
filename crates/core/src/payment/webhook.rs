//! Asynchronous settlement: the gateway reports the outcome of a checkout
//! and this reconciler drives the booking to its final state.
//!
//! Deliveries are at-least-once and unordered. The conditional updates in
//! the payments queries are the sole race control; everything after them is
//! idempotent per `(booking_id, seat_id)` on the engine side.

use chrono::Utc;
use cineseat_db::{queries::payments, PgPool};
use cineseat_engine::SeatEngine;
use cineseat_types::api::{WebhookAck, WebhookPayload};
use cineseat_types::{codes, validate_payment_provider, validate_webhook_status, AppError};

use crate::booking::{confirm_seats_after_payment, release_seats_after_payment_failure};
use crate::db_error;

pub async fn handle_webhook(
    pool: &PgPool,
    engine: &SeatEngine,
    provider: &str,
    payload: &WebhookPayload,
) -> Result<WebhookAck, AppError> {
    validate_payment_provider(provider)
        .map_err(|msg| AppError::Validation(codes::BAD_PROVIDER, msg))?;
    validate_webhook_status(&payload.status)
        .map_err(|msg| AppError::Validation(codes::INVALID_INPUT, msg))?;

    if payload.transaction_id.is_empty() {
        return Err(AppError::Validation(
            codes::INVALID_INPUT,
            "transaction_id is required".into(),
        ));
    }

    let payment = payments::find_by_gateway_transaction_id(pool, &payload.transaction_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(
                codes::PAYMENT_NOT_FOUND,
                format!("No payment for transaction {}", payload.transaction_id),
            )
        })?;

    if payload.amount != payment.amount {
        // Settle anyway; the mismatch is an audit concern, not a race.
        tracing::warn!(
            payment_id = %payment.id,
            expected = payment.amount,
            reported = payload.amount,
            "webhook amount differs from payment amount"
        );
    }

    if payment.status == "completed" {
        tracing::info!(
            payment_id = %payment.id,
            provider,
            "webhook replay for completed payment, no-op"
        );
        return Ok(WebhookAck {
            success: true,
            message: "Payment already processed".into(),
        });
    }

    match payload.status.as_str() {
        "failed" => {
            match payments::fail_if_not_completed(pool, &payload.transaction_id)
                .await
                .map_err(db_error)?
            {
                Some(failed) => {
                    tracing::info!(
                        payment_id = %failed.id,
                        booking_id = %failed.booking_id,
                        provider,
                        "payment failed, releasing seats"
                    );
                    release_seats_after_payment_failure(pool, engine, failed.booking_id).await?;
                    Ok(WebhookAck {
                        success: true,
                        message: "Payment failure recorded".into(),
                    })
                }
                None => Ok(WebhookAck {
                    success: true,
                    message: "Payment already settled".into(),
                }),
            }
        }
        "success" => {
            let paid_at = payload.paid_at.unwrap_or_else(Utc::now);
            match payments::complete_if_not_completed(pool, &payload.transaction_id, paid_at)
                .await
                .map_err(db_error)?
            {
                Some(completed) => {
                    tracing::info!(
                        payment_id = %completed.id,
                        booking_id = %completed.booking_id,
                        provider,
                        "payment completed, confirming seats"
                    );
                    let fully = confirm_seats_after_payment(pool, engine, completed.booking_id).await?;
                    Ok(WebhookAck {
                        success: true,
                        message: if fully {
                            "Payment completed".into()
                        } else {
                            "Payment completed; seat confirmation needs review".into()
                        },
                    })
                }
                // Lost the guard to a concurrent delivery: report success
                // without touching anything.
                None => Ok(WebhookAck {
                    success: true,
                    message: "Payment already processed".into(),
                }),
            }
        }
        // "pending": acknowledged, no lifecycle action
        _ => {
            tracing::debug!(
                payment_id = %payment.id,
                provider,
                "gateway reports payment still pending"
            );
            Ok(WebhookAck {
                success: true,
                message: "Pending status recorded".into(),
            })
        }
    }
}
