use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    #[default]
    Available,
    Held,
    Booked,
}

impl FromStr for SeatStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "held" => Ok(Self::Held),
            "booked" => Ok(Self::Booked),
            "available" | _ => Ok(Self::Available),
        }
    }
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Held => "held",
            Self::Booked => "booked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    #[default]
    Standard,
    Vip,
    Couple,
    Premium,
}

impl FromStr for SeatType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vip" => Ok(Self::Vip),
            "couple" => Ok(Self::Couple),
            "premium" => Ok(Self::Premium),
            "standard" | _ => Ok(Self::Standard),
        }
    }
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Vip => "vip",
            Self::Couple => "couple",
            Self::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Expired,
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            "pending" | _ => Ok(Self::Pending),
        }
    }
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    Refunded,
}

impl FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            "pending" | _ => Ok(Self::Pending),
        }
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Terminal for the confirm path: a completed payment is never reprocessed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Refunded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    #[default]
    Momo,
    Vnpay,
    Zalopay,
    Card,
}

impl FromStr for PaymentProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "momo" => Ok(Self::Momo),
            "vnpay" => Ok(Self::Vnpay),
            "zalopay" => Ok(Self::Zalopay),
            "card" => Ok(Self::Card),
            _ => Err(()),
        }
    }
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Momo => "momo",
            Self::Vnpay => "vnpay",
            Self::Zalopay => "zalopay",
            Self::Card => "card",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdempotencyStatus {
    #[default]
    Processing,
    Completed,
    Failed,
}

impl FromStr for IdempotencyStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "processing" | _ => Ok(Self::Processing),
        }
    }
}

impl IdempotencyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[default]
    Booking,
    Payment,
    Refund,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Payment => "payment",
            Self::Refund => "refund",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_provider_is_strict() {
        assert_eq!("momo".parse::<PaymentProvider>(), Ok(PaymentProvider::Momo));
        assert_eq!("card".parse::<PaymentProvider>(), Ok(PaymentProvider::Card));
        assert!("stripe".parse::<PaymentProvider>().is_err());
        assert!("".parse::<PaymentProvider>().is_err());
    }

    #[test]
    fn test_seat_status_round_trip() {
        for status in [SeatStatus::Available, SeatStatus::Held, SeatStatus::Booked] {
            assert_eq!(status.as_str().parse::<SeatStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_payment_terminal_states() {
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::Processing.is_terminal());
    }

    #[test]
    fn test_booking_status_defaults_to_pending() {
        assert_eq!("garbage".parse::<BookingStatus>(), Ok(BookingStatus::Pending));
    }
}
