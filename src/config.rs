use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Monthly membership fee applied when generating dues. Override via
/// `DUES_MEMBERSHIP_FEE` (decimal string, e.g. `10.90`).
pub static DUES_MEMBERSHIP_FEE: Lazy<Decimal> = Lazy::new(|| {
    std::env::var("DUES_MEMBERSHIP_FEE")
        .ok()
        .and_then(|value| Decimal::from_str(value.trim()).ok())
        .filter(|value| *value >= Decimal::ZERO)
        .unwrap_or_else(|| Decimal::new(1090, 2))
});

/// key: dues-config -> lower bound of the accepted period year range
pub static DUES_MIN_YEAR: Lazy<i32> = Lazy::new(|| {
    std::env::var("DUES_MIN_YEAR")
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(2000)
});

/// key: dues-config -> upper bound of the accepted period year range
pub static DUES_MAX_YEAR: Lazy<i32> = Lazy::new(|| {
    std::env::var("DUES_MAX_YEAR")
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(2100)
});

/// key: dues-config -> overdue sweep cadence
pub static DUES_SWEEP_INTERVAL_SECS: Lazy<u64> = Lazy::new(|| {
    std::env::var("DUES_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(3600)
});

/// key: dues-config -> when set, each tick also runs the idempotent
/// generation for the current period
pub static DUES_AUTO_GENERATE: Lazy<bool> = Lazy::new(|| read_bool_env("DUES_AUTO_GENERATE"));

/// PIX key stamped into generated payment payloads. Payload generation is
/// disabled when unset; dues still carry a payment reference.
pub static PIX_KEY: Lazy<Option<String>> = Lazy::new(|| read_optional_env("PIX_KEY"));

/// Merchant name rendered into PIX payloads.
pub static PIX_MERCHANT_NAME: Lazy<String> = Lazy::new(|| {
    read_optional_env("PIX_MERCHANT_NAME").unwrap_or_else(|| "ASSOCIACAO".to_string())
});

/// Merchant city rendered into PIX payloads.
pub static PIX_MERCHANT_CITY: Lazy<String> = Lazy::new(|| {
    read_optional_env("PIX_MERCHANT_CITY").unwrap_or_else(|| "SAO PAULO".to_string())
});

/// When set to a truthy value, allows the worker to continue running even if
/// database migrations fail. Defaults to `false`.
pub static ALLOW_MIGRATION_FAILURE: Lazy<bool> =
    Lazy::new(|| read_bool_env("ALLOW_MIGRATION_FAILURE"));

fn read_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_bool_env(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes")
        })
        .unwrap_or(false)
}
