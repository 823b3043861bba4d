//! Client configuration.
//!
//! This module handles:
//! - Transport settings with defaults ([`ClientConfig`])
//! - Range validation ([`validate_config`])
//! - Secure API key storage via [`ApiKey`]
//!
//! Nothing here reads the environment; callers build a config in code.
//!
//! # Example
//!
//! ```
//! use sheetconv::config::ClientConfig;
//! use sheetconv::retry::{Backoff, RetryPolicy};
//!
//! let config = ClientConfig::new()
//!     .with_timeout_ms(30_000)
//!     .with_deadline_ms(120_000)
//!     .with_retry(RetryPolicy::new().with_backoff(Backoff::Exponential));
//!
//! assert!(sheetconv::config::validate_config(&config).is_ok());
//! ```

mod secret;
mod validation;

pub use secret::ApiKey;
pub use validation::{
    validate_config, MAX_ATTEMPTS, MAX_CONCURRENCY, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS,
};

use crate::retry::RetryPolicy;

/// Default conversion service host.
pub const DEFAULT_BASE_URL: &str = "https://json2xls-json-xls-v1.p.mashape.com";
/// Default name of the header carrying the API key.
pub const DEFAULT_API_KEY_HEADER: &str = "X-Mashape-Key";
/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Transport configuration for a [`Client`](crate::client::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host of the conversion service, without a path.
    pub base_url: String,
    /// Header used to send the API key.
    pub api_key_header: String,
    /// Timeout for each physical attempt in milliseconds.
    pub timeout_ms: u64,
    /// Optional bound on a whole conversion call, retries included.
    pub deadline_ms: Option<u64>,
    /// Retry behavior.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the API key header name.
    #[must_use]
    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Set per-attempt timeout in milliseconds.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the overall call deadline in milliseconds.
    #[must_use]
    pub const fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            deadline_ms: None,
            retry: RetryPolicy::default(),
        }
    }
}
