//! Conversion implementations from DB models to API response types.
//!
//! These From implementations centralize the mapping so route handlers and
//! orchestrators never rebuild responses field by field.

use crate::models::{Booking, Payment};
use cineseat_types::api::{
    BookingResponse, CancelBookingResponse, CreatePaymentResponse, HoldSeatsResponse,
    PaymentResponse,
};

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            showtime_id: b.showtime_id,
            booking_code: b.booking_code,
            seats: b.seats.0,
            total_amount: b.total_amount,
            discount_amount: b.discount_amount,
            final_amount: b.final_amount,
            currency: b.currency,
            status: b.status.parse().unwrap_or_default(),
            held_at: b.held_at,
            hold_expires_at: b.hold_expires_at,
            confirmed_at: b.confirmed_at,
            cancelled_at: b.cancelled_at,
            cancellation_reason: b.cancellation_reason,
            payment_id: b.payment_id,
            created_at: b.created_at,
        }
    }
}

impl From<Booking> for HoldSeatsResponse {
    fn from(b: Booking) -> Self {
        Self {
            booking_id: b.id,
            booking_code: b.booking_code,
            showtime_id: b.showtime_id,
            status: b.status.parse().unwrap_or_default(),
            seats: b.seats.0,
            total_amount: b.total_amount,
            discount_amount: b.discount_amount,
            final_amount: b.final_amount,
            currency: b.currency,
            held_at: b.held_at,
            hold_expires_at: b.hold_expires_at,
        }
    }
}

impl From<Booking> for CancelBookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            booking_id: b.id,
            booking_code: b.booking_code,
            status: b.status.parse().unwrap_or_default(),
            cancelled_at: b.cancelled_at,
            cancellation_reason: b.cancellation_reason,
        }
    }
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            booking_id: p.booking_id,
            user_id: p.user_id,
            amount: p.amount,
            currency: p.currency,
            payment_method: p.payment_method.parse().unwrap_or_default(),
            status: p.status.parse().unwrap_or_default(),
            gateway_transaction_id: p.gateway_transaction_id,
            payment_url: p.payment_url,
            expires_at: p.expires_at,
            paid_at: p.paid_at,
            attempt_count: p.attempt_count,
            created_at: p.created_at,
        }
    }
}

impl From<Payment> for CreatePaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            payment_id: p.id,
            booking_id: p.booking_id,
            status: p.status.parse().unwrap_or_default(),
            amount: p.amount,
            currency: p.currency,
            payment_method: p.payment_method.parse().unwrap_or_default(),
            payment_url: p.payment_url,
            expires_at: p.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cineseat_types::api::BookingSeat;
    use cineseat_types::enums::{BookingStatus, PaymentProvider, PaymentStatus, SeatType};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn sample_booking() -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            showtime_id: Uuid::new_v4(),
            booking_code: "BK-7Q2M4X9A".into(),
            seats: Json(vec![
                BookingSeat {
                    seat_id: "A1".into(),
                    seat_type: SeatType::Vip,
                    price: 150_000,
                },
                BookingSeat {
                    seat_id: "A2".into(),
                    seat_type: SeatType::Standard,
                    price: 90_000,
                },
            ]),
            total_amount: 240_000,
            discount_amount: 0,
            final_amount: 240_000,
            currency: "VND".into(),
            status: "pending".into(),
            held_at: now,
            hold_expires_at: now + chrono::Duration::seconds(600),
            idempotency_key: Uuid::new_v4().to_string(),
            confirmed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_booking_to_hold_response() {
        let booking = sample_booking();
        let id = booking.id;
        let response: HoldSeatsResponse = booking.into();

        assert_eq!(response.booking_id, id);
        assert_eq!(response.status, BookingStatus::Pending);
        assert_eq!(response.seats.len(), 2);
        assert_eq!(response.seats[0].seat_type, SeatType::Vip);
        assert_eq!(response.total_amount, 240_000);
        assert_eq!(response.final_amount, 240_000);
    }

    #[test]
    fn test_unknown_status_string_falls_back_to_default() {
        let mut booking = sample_booking();
        booking.status = "definitely-not-a-status".into();
        let response: BookingResponse = booking.into();
        assert_eq!(response.status, BookingStatus::Pending);
    }

    #[test]
    fn test_payment_to_create_response() {
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            idempotency_key: Uuid::new_v4().to_string(),
            amount: 240_000,
            currency: "VND".into(),
            payment_method: "momo".into(),
            status: "processing".into(),
            gateway_transaction_id: Some("momo_abc123".into()),
            payment_url: Some("https://sandbox.gateway.test/pay/momo_abc123".into()),
            expires_at: now + chrono::Duration::seconds(900),
            paid_at: None,
            attempt_count: 1,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        let response: CreatePaymentResponse = payment.into();
        assert_eq!(response.status, PaymentStatus::Processing);
        assert_eq!(response.payment_method, PaymentProvider::Momo);
        assert!(response.payment_url.is_some());
    }
}
