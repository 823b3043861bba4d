//! Error types for the conversion client.
//!
//! This module defines a two-level error system:
//! - [`Error`]: Top-level error wrapping both subsystems
//! - [`ConfigError`]: Construction-time validation failures
//! - [`ConvertError`]: Failures while executing a conversion call
//!
//! All errors implement `Send + Sync + Clone` so they can cross task
//! boundaries and be stored in the attempt log.

use thiserror::Error;

/// Top-level error.
///
/// Both [`ConfigError`] and [`ConvertError`] convert into it, so callers that
/// construct a client and convert in the same function can use `?` on both.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Conversion error.
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),
}

/// Configuration errors.
///
/// Raised at client construction time, before any network activity.
/// A client is never built from a configuration that produced one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Unsupported spreadsheet format.
    #[error("Invalid format: {value:?} (expected XLSX or XLS)")]
    InvalidFormat {
        /// The rejected value.
        value: String,
    },

    /// Unsupported view.
    #[error("Invalid view: {value:?} (expected Hierarchy, Plain or Both)")]
    InvalidView {
        /// The rejected value.
        value: String,
    },

    /// Unsupported layout.
    #[error("Invalid layout: {value:?} (expected Auto, Portrait or Landscape)")]
    InvalidLayout {
        /// The rejected value.
        value: String,
    },

    /// Unsupported internal IDs option.
    #[error("Invalid internalIDs: {value:?} (expected Both or None)")]
    InvalidInternalIds {
        /// The rejected value.
        value: String,
    },

    /// A transport setting is out of range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// The setting name.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("Failed to create HTTP client: {message}")]
    HttpClient {
        /// Description of the failure.
        message: String,
    },
}

/// Conversion errors.
///
/// These errors represent failures of a single logical conversion call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The outbound request could not be constructed. Never retried.
    #[error("Failed to build request: {message}")]
    RequestBuild {
        /// Description of what could not be built.
        message: String,
    },

    /// Every attempt failed at the transport level.
    #[error("Transport failed after {attempts} attempts: {message}")]
    Transport {
        /// Number of physical attempts made by the chain that failed last.
        attempts: u32,
        /// The last failure observed.
        message: String,
    },

    /// The response body could not be fully read.
    #[error("Failed to read response body: {message}")]
    ResponseRead {
        /// Description of the read failure.
        message: String,
    },

    /// The overall call deadline elapsed.
    #[error("Conversion deadline exceeded after {deadline_ms}ms")]
    DeadlineExceeded {
        /// Configured deadline in milliseconds.
        deadline_ms: u64,
    },

    /// The call was cancelled by the caller.
    #[error("Conversion cancelled")]
    Cancelled,
}

impl ConvertError {
    /// Returns true if this error is a transport-level failure.
    ///
    /// Response read failures, deadlines and cancellations are never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
