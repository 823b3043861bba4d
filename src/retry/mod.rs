//! Retry policy and backoff.
//!
//! A conversion call starts [`RetryPolicy::concurrency`] attempt chains that
//! race each other. Each chain makes up to [`RetryPolicy::max_attempts`]
//! attempts and sleeps [`RetryPolicy::delay_for_retry`] between them.
//!
//! Failed attempts can be recorded in an [`AttemptLog`] for diagnostics.

mod attempt_log;

pub use attempt_log::{AttemptLog, AttemptRecord, MAX_LOG_ENTRIES};

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default number of racing attempt chains.
pub const DEFAULT_CONCURRENCY: u32 = 3;
/// Default attempts per chain.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default backoff base in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Default upper bound of the random jitter in milliseconds.
pub const DEFAULT_MAX_JITTER_MS: u64 = 1_000;

/// Largest exponent applied by the exponential strategies.
const MAX_EXPONENT: u32 = 16;

/// How long to wait before the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Always wait `base`.
    Constant,
    /// Wait `base * n`.
    Linear,
    /// Wait `base * n` plus jitter.
    LinearJitter,
    /// Wait `base * 2^(n-1)`.
    Exponential,
    /// Wait `base * 2^(n-1)` plus jitter.
    #[default]
    ExponentialJitter,
}

impl Backoff {
    const fn has_jitter(self) -> bool {
        matches!(self, Self::LinearJitter | Self::ExponentialJitter)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of attempt chains raced per call.
    pub concurrency: u32,
    /// Maximum attempts per chain, the first one included.
    pub max_attempts: u32,
    /// Delay strategy between attempts.
    pub backoff: Backoff,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound of the random jitter in milliseconds.
    pub max_jitter_ms: u64,
    /// Whether failed attempts are kept in the client's attempt log.
    pub keep_log: bool,
}

impl RetryPolicy {
    /// Create a policy with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never waits, for tests and latency-sensitive callers.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            backoff: Backoff::None,
            base_delay_ms: 0,
            max_jitter_ms: 0,
            ..Self::default()
        }
    }

    /// Set the number of racing chains.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the attempts per chain.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the backoff strategy.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the base delay in milliseconds.
    #[must_use]
    pub const fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Set the jitter bound in milliseconds.
    #[must_use]
    pub const fn with_max_jitter_ms(mut self, max_jitter_ms: u64) -> Self {
        self.max_jitter_ms = max_jitter_ms;
        self
    }

    /// Enable or disable the attempt log.
    #[must_use]
    pub const fn with_keep_log(mut self, keep_log: bool) -> Self {
        self.keep_log = keep_log;
        self
    }

    /// Deterministic part of the delay before retry `retry` (1-based).
    #[must_use]
    pub fn base_delay_for_retry(&self, retry: u32) -> Duration {
        let base = self.base_delay_ms;
        let retry = u64::from(retry.max(1));
        let ms = match self.backoff {
            Backoff::None => 0,
            Backoff::Constant => base,
            Backoff::Linear | Backoff::LinearJitter => base.saturating_mul(retry),
            Backoff::Exponential | Backoff::ExponentialJitter => {
                let exponent = u32::try_from(retry - 1).unwrap_or(MAX_EXPONENT).min(MAX_EXPONENT);
                base.saturating_mul(1_u64 << exponent)
            }
        };
        Duration::from_millis(ms)
    }

    /// Full delay before retry `retry` (1-based), jitter included.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let delay = self.base_delay_for_retry(retry);
        if self.backoff.has_jitter() && self.max_jitter_ms > 0 {
            let jitter = rand::thread_rng().gen_range(0..=self.max_jitter_ms);
            delay.saturating_add(Duration::from_millis(jitter))
        } else {
            delay
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::default(),
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_jitter_ms: DEFAULT_MAX_JITTER_MS,
            keep_log: true,
        }
    }
}
