use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cineseat_core::idempotency::Idempotent;
use cineseat_core::payment;
use cineseat_types::api::{CreatePaymentRequest, PaymentResponse, WebhookAck, WebhookPayload};
use cineseat_types::{codes, AppError};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::{AppState, AuthUser};
use crate::response::{self, ApiError};
use crate::routes::idempotency_key;

/// Create a payment for a pending booking
pub async fn create_payment(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(|e| {
        AppError::Validation(codes::INVALID_INPUT, format!("Validation error: {e}"))
    })?;

    let key = idempotency_key(&headers)?;

    let outcome = payment::create_payment(
        &state.db,
        &state.gateway,
        &state.config,
        user_id,
        &key,
        &payload,
    )
    .await?;

    match outcome {
        Idempotent::Fresh(created) => {
            let status =
                StatusCode::from_u16(created.status_code).unwrap_or(StatusCode::CREATED);
            Ok((status, Json(created.response)).into_response())
        }
        Idempotent::Replayed { status_code, body } => Ok(response::replay(status_code, body)),
    }
}

/// Get payment by ID (owner only)
pub async fn get_payment(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = payment::get_payment(&state.db, id, user_id).await?;
    Ok(Json(payment.into()))
}

/// Gateway webhook: settles a payment and drives the booking lifecycle.
/// Provider-specific HMAC verification happens upstream; this boundary only
/// refuses deliveries that carry no signature at all.
pub async fn webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<WebhookAck>, ApiError> {
    if headers.get("x-signature").is_none() {
        return Err(ApiError(AppError::Validation(
            codes::INVALID_INPUT,
            "Missing X-Signature header".into(),
        )));
    }

    let ack = payment::handle_webhook(&state.db, &state.engine, &provider, &payload).await?;

    Ok(Json(ack))
}
