use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use cineseat_core::booking;
use cineseat_core::idempotency::Idempotent;
use cineseat_core::payment;
use cineseat_types::api::{
    BookingResponse, CancelBookingResponse, ConfirmBookingRequest, CreatePaymentRequest,
    ExtendHoldRequest, ExtendHoldResponse, HoldSeatsRequest,
};
use cineseat_types::{codes, AppError};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::{AppState, AuthUser};
use crate::response::{self, ApiError};
use crate::routes::idempotency_key;

/// Hold seats for a showtime
pub async fn hold_seats(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<HoldSeatsRequest>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(|e| {
        AppError::Validation(codes::INVALID_INPUT, format!("Validation error: {e}"))
    })?;

    let key = idempotency_key(&headers)?;

    let outcome = booking::hold_seats(
        &state.db,
        &state.engine,
        &state.config,
        user_id,
        &key,
        &payload,
    )
    .await?;

    match outcome {
        Idempotent::Fresh(resp) => Ok((StatusCode::CREATED, Json(resp)).into_response()),
        Idempotent::Replayed { status_code, body } => Ok(response::replay(status_code, body)),
    }
}

/// Get booking by ID (owner only)
pub async fn get_booking(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = booking::get_booking(&state.db, id, user_id).await?;
    Ok(Json(booking.into()))
}

/// Cancel a pending booking, returning its seats to the pool
pub async fn cancel_booking(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelBookingResponse>, ApiError> {
    let cancelled = booking::cancel_booking(&state.db, &state.engine, id, user_id).await?;
    Ok(Json(cancelled.into()))
}

/// Confirm a booking: opens the payment that charges it.
/// Same flow as POST /api/payments with the booking id taken from the path.
pub async fn confirm_booking(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<ConfirmBookingRequest>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(|e| {
        AppError::Validation(codes::INVALID_INPUT, format!("Validation error: {e}"))
    })?;

    let key = idempotency_key(&headers)?;
    let request = CreatePaymentRequest {
        booking_id: id,
        payment_method: payload.payment_method,
        return_url: payload.return_url,
    };

    let outcome = payment::create_payment(
        &state.db,
        &state.gateway,
        &state.config,
        user_id,
        &key,
        &request,
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

/// Extend the hold on a pending booking
pub async fn extend_hold(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExtendHoldRequest>,
) -> Result<Json<ExtendHoldResponse>, ApiError> {
    payload.validate().map_err(|e| {
        AppError::Validation(codes::INVALID_INPUT, format!("Validation error: {e}"))
    })?;

    let extended = booking::extend_hold(
        &state.db,
        &state.engine,
        id,
        user_id,
        payload.additional_seconds,
    )
    .await?;

    Ok(Json(extended))
}
