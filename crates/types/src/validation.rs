//! Validation helpers for boundary string values.
//!
//! These constants and functions centralize validation of string values
//! against known valid options before they reach the orchestrators.

/// Valid payment gateway providers
pub const VALID_PROVIDERS: &[&str] = &["momo", "vnpay", "zalopay", "card"];

/// Valid webhook payload statuses
pub const VALID_WEBHOOK_STATUSES: &[&str] = &["success", "failed", "pending"];

/// Maximum accepted idempotency key length (keys are otherwise opaque)
pub const MAX_IDEMPOTENCY_KEY_LEN: usize = 100;

/// Validates that a value is one of the allowed values.
pub fn validate_enum_value(value: &str, valid_values: &[&str], field_name: &str) -> Result<(), String> {
    if valid_values.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        ))
    }
}

/// Validates a payment provider value
pub fn validate_payment_provider(provider: &str) -> Result<(), String> {
    validate_enum_value(provider, VALID_PROVIDERS, "payment provider")
}

/// Validates a webhook status value
pub fn validate_webhook_status(status: &str) -> Result<(), String> {
    validate_enum_value(status, VALID_WEBHOOK_STATUSES, "webhook status")
}

/// Validates a seat identifier: row letter followed by a column number (A1, K14).
pub fn validate_seat_id(seat_id: &str) -> Result<(), String> {
    let mut chars = seat_id.chars();
    let row_ok = chars.next().is_some_and(|c| c.is_ascii_uppercase());
    let rest: Vec<char> = chars.collect();
    let col_ok = !rest.is_empty() && rest.len() <= 3 && rest.iter().all(|c| c.is_ascii_digit());

    if row_ok && col_ok {
        Ok(())
    } else {
        Err(format!(
            "Invalid seat id '{}'. Expected row letter + column number (e.g. A1)",
            seat_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_payment_provider() {
        assert!(validate_payment_provider("momo").is_ok());
        assert!(validate_payment_provider("vnpay").is_ok());
        assert!(validate_payment_provider("zalopay").is_ok());
        assert!(validate_payment_provider("card").is_ok());
        assert!(validate_payment_provider("stripe").is_err());
    }

    #[test]
    fn test_validate_webhook_status() {
        assert!(validate_webhook_status("success").is_ok());
        assert!(validate_webhook_status("failed").is_ok());
        assert!(validate_webhook_status("pending").is_ok());
        assert!(validate_webhook_status("done").is_err());
    }

    #[test]
    fn test_validate_seat_id() {
        assert!(validate_seat_id("A1").is_ok());
        assert!(validate_seat_id("K14").is_ok());
        assert!(validate_seat_id("Z999").is_ok());
        assert!(validate_seat_id("a1").is_err());
        assert!(validate_seat_id("A").is_err());
        assert!(validate_seat_id("11").is_err());
        assert!(validate_seat_id("A1000").is_err());
        assert!(validate_seat_id("").is_err());
    }
}
