//! Transport settings validation.
//!
//! Ranges are checked once when a client is built, never per call.

use super::ClientConfig;
use crate::error::ConfigError;

/// Minimum per-attempt timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 1;

/// Maximum per-attempt timeout in milliseconds (10 minutes).
pub const MAX_TIMEOUT_MS: u64 = 600_000;

/// Maximum number of racing attempt chains.
pub const MAX_CONCURRENCY: u32 = 10;

/// Maximum number of attempts per chain.
pub const MAX_ATTEMPTS: u32 = 10;

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Validate client transport settings.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if:
/// - `base_url` is empty or not an `http(s)://` URL
/// - `api_key_header` is empty
/// - `timeout_ms` is outside `MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS`
/// - `deadline_ms` is set to zero
/// - `retry.concurrency` is outside `1..=MAX_CONCURRENCY`
/// - `retry.max_attempts` is outside `1..=MAX_ATTEMPTS`
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(invalid("base_url", "must start with http:// or https://"));
    }

    if config.api_key_header.trim().is_empty() {
        return Err(invalid("api_key_header", "must not be empty"));
    }

    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&config.timeout_ms) {
        return Err(invalid(
            "timeout_ms",
            format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS} ms"),
        ));
    }

    if config.deadline_ms == Some(0) {
        return Err(invalid("deadline_ms", "must be at least 1 ms"));
    }

    if !(1..=MAX_CONCURRENCY).contains(&config.retry.concurrency) {
        return Err(invalid(
            "concurrency",
            format!("must be between 1 and {MAX_CONCURRENCY}"),
        ));
    }

    if !(1..=MAX_ATTEMPTS).contains(&config.retry.max_attempts) {
        return Err(invalid(
            "max_attempts",
            format!("must be between 1 and {MAX_ATTEMPTS}"),
        ));
    }

    Ok(())
}
