use chrono::{Duration, Utc};
use cineseat_db::models::Payment;
use cineseat_db::queries::payments::{self, NewPayment};
use cineseat_db::queries::bookings;
use cineseat_db::{unique_violation, PgPool};
use cineseat_integrations::GatewayClient;
use cineseat_types::api::{CreatePaymentRequest, CreatePaymentResponse};
use cineseat_types::enums::ResourceType;
use cineseat_types::{codes, AppConfig, AppError};
use uuid::Uuid;

use crate::idempotency::{self, Begin, Idempotent};
use crate::db_error;

/// A created (201) or reused in-flight (200) payment.
#[derive(Debug, Clone)]
pub struct PaymentCreated {
    pub status_code: u16,
    pub response: CreatePaymentResponse,
}

/// Create (or replay) the payment charging a pending booking.
pub async fn create_payment(
    pool: &PgPool,
    gateway: &GatewayClient,
    config: &AppConfig,
    user_id: Uuid,
    idempotency_key: &str,
    req: &CreatePaymentRequest,
) -> Result<Idempotent<PaymentCreated>, AppError> {
    let body = serde_json::to_value(req).map_err(|e| AppError::internal(e.to_string()))?;

    match idempotency::begin(
        pool,
        idempotency_key,
        user_id,
        "/payments",
        &body,
        ResourceType::Payment,
        config.idempotency_ttl_secs,
    )
    .await?
    {
        Begin::Replay { status_code, body } => {
            return Ok(Idempotent::Replayed { status_code, body })
        }
        Begin::New => {}
    }

    match create_payment_fresh(pool, gateway, config, user_id, idempotency_key, req).await {
        Ok((status_code, response)) => {
            match serde_json::to_value(&response) {
                Ok(body) => {
                    idempotency::complete(
                        pool,
                        idempotency_key,
                        user_id,
                        status_code,
                        &body,
                        Some(&response.payment_id.to_string()),
                    )
                    .await;
                }
                Err(err) => {
                    tracing::error!(error = %err, "could not serialize payment response for idempotency cache");
                }
            }
            Ok(Idempotent::Fresh(PaymentCreated {
                status_code,
                response,
            }))
        }
        Err(err) => {
            idempotency::fail(pool, idempotency_key, user_id, &err).await;
            Err(err)
        }
    }
}

async fn create_payment_fresh(
    pool: &PgPool,
    gateway: &GatewayClient,
    config: &AppConfig,
    user_id: Uuid,
    idempotency_key: &str,
    req: &CreatePaymentRequest,
) -> Result<(u16, CreatePaymentResponse), AppError> {
    let booking = bookings::find_by_id(pool, req.booking_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| {
            AppError::NotFound(
                codes::BOOKING_NOT_FOUND,
                format!("Booking {} not found", req.booking_id),
            )
        })?;

    if booking.user_id != user_id {
        return Err(AppError::Forbidden(
            codes::BOOKING_NOT_OWNED,
            "You can only pay for your own bookings".into(),
        ));
    }

    match booking.status.as_str() {
        "pending" => {}
        "confirmed" => {
            return Err(AppError::Conflict(
                codes::BOOKING_ALREADY_PAID,
                "Booking is already paid".into(),
            ))
        }
        other => {
            return Err(AppError::PreconditionFailed(
                codes::BOOKING_NOT_PENDING,
                format!("Booking is {other}"),
            ))
        }
    }

    if booking.hold_expires_at <= Utc::now() {
        return Err(AppError::PreconditionFailed(
            codes::BOOKING_HOLD_EXPIRED,
            "The seat hold behind this booking has expired".into(),
        ));
    }

    // One live payment per booking: reuse an in-flight checkout instead of
    // opening a second one.
    let existing = payments::find_for_booking(pool, booking.id)
        .await
        .map_err(db_error)?;
    for payment in &existing {
        if payment.status == "completed" {
            return Err(AppError::Conflict(
                codes::BOOKING_ALREADY_PAID,
                "Booking is already paid".into(),
            ));
        }
    }
    if let Some(live) = existing.iter().find(|p| p.is_live()) {
        tracing::info!(
            payment_id = %live.id,
            booking_id = %booking.id,
            "returning existing live payment for booking"
        );
        return Ok((200, live.clone().into()));
    }

    let expires_at = Utc::now() + Duration::seconds(config.payment_expiry_secs);
    let new = NewPayment {
        id: Uuid::new_v4(),
        booking_id: booking.id,
        user_id,
        idempotency_key: idempotency_key.to_string(),
        amount: booking.final_amount,
        currency: booking.currency.clone(),
        payment_method: req.payment_method.as_str().to_string(),
        expires_at,
    };

    let payment = match payments::create(pool, &new).await {
        Ok(payment) => payment,
        Err(err) if unique_violation(&err).is_some() => {
            // Another call with this key raced us to the insert; hand back
            // whatever it created.
            let winner = payments::find_by_idempotency_key(pool, idempotency_key)
                .await
                .map_err(db_error)?
                .ok_or_else(|| {
                    AppError::internal("payment vanished after idempotency collision")
                })?;
            return Ok((200, winner.into()));
        }
        Err(err) => return Err(db_error(err)),
    };

    let checkout = gateway
        .create_checkout(
            payment.id,
            req.payment_method.as_str(),
            payment.amount,
            &payment.currency,
            req.return_url.as_deref(),
            expires_at,
        )
        .await
        .map_err(|err| AppError::ExternalService(format!("gateway checkout failed: {err}")))?;

    if !checkout.success {
        return Err(AppError::ExternalService(
            "gateway declined to open a checkout".into(),
        ));
    }

    let payment: Payment = match payments::mark_processing(
        pool,
        payment.id,
        &checkout.transaction_id,
        &checkout.payment_url,
    )
    .await
    .map_err(db_error)?
    {
        Some(updated) => updated,
        None => {
            // A webhook can land before we finish; read the settled row.
            payments::find_by_id(pool, payment.id)
                .await
                .map_err(db_error)?
                .ok_or_else(|| AppError::internal("payment disappeared mid-create"))?
        }
    };

    bookings::set_payment(pool, booking.id, payment.id)
        .await
        .map_err(db_error)?;

    tracing::info!(
        payment_id = %payment.id,
        booking_id = %booking.id,
        method = %payment.payment_method,
        amount = payment.amount,
        "payment created and checkout opened"
    );

    Ok((201, payment.into()))
}
