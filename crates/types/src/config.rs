//! Runtime configuration knobs shared by the API server and the job runner.

/// Application configuration with environment overrides.
///
/// Every field has a production default; binaries call [`AppConfig::from_env`]
/// after loading `.env` so individual deployments can tune the windows.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// How long a hold keeps seats reserved before payment (seconds)
    pub hold_duration_secs: i64,
    /// How long a created payment stays payable (seconds)
    pub payment_expiry_secs: i64,
    /// Lifetime of idempotency records (seconds)
    pub idempotency_ttl_secs: i64,
    /// TTL on the per-showtime seat keys in the KV store (seconds)
    pub showtime_kv_ttl_secs: i64,
    /// Period of the expiry reaper (seconds)
    pub reaper_period_secs: i64,
    /// Maximum seats a single booking may hold
    pub max_seats_per_booking: usize,
    /// How many expired bookings the reaper processes concurrently
    pub batch_cleanup_parallelism: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hold_duration_secs: 600,
            payment_expiry_secs: 15 * 60,
            idempotency_ttl_secs: 24 * 60 * 60,
            showtime_kv_ttl_secs: 7 * 24 * 60 * 60,
            reaper_period_secs: 60,
            max_seats_per_booking: 10,
            batch_cleanup_parallelism: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hold_duration_secs: env_i64("HOLD_DURATION_SECS", defaults.hold_duration_secs),
            payment_expiry_secs: env_i64("PAYMENT_EXPIRY_SECS", defaults.payment_expiry_secs),
            idempotency_ttl_secs: env_i64("IDEMPOTENCY_TTL_SECS", defaults.idempotency_ttl_secs),
            showtime_kv_ttl_secs: env_i64("SHOWTIME_KV_TTL_SECS", defaults.showtime_kv_ttl_secs),
            reaper_period_secs: env_i64("REAPER_PERIOD_SECS", defaults.reaper_period_secs),
            max_seats_per_booking: env_i64("MAX_SEATS_PER_BOOKING", defaults.max_seats_per_booking as i64)
                as usize,
            batch_cleanup_parallelism: env_i64(
                "BATCH_CLEANUP_PARALLELISM",
                defaults.batch_cleanup_parallelism as i64,
            ) as usize,
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_windows() {
        let config = AppConfig::default();
        assert_eq!(config.hold_duration_secs, 600);
        assert_eq!(config.payment_expiry_secs, 900);
        assert_eq!(config.idempotency_ttl_secs, 86_400);
        assert_eq!(config.showtime_kv_ttl_secs, 604_800);
        assert_eq!(config.reaper_period_secs, 60);
        assert_eq!(config.max_seats_per_booking, 10);
        assert_eq!(config.batch_cleanup_parallelism, 10);
    }
}
