//! Diagnostic log of failed attempts.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Oldest records are evicted beyond this many.
pub const MAX_LOG_ENTRIES: usize = 1_000;

/// One failed physical attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    /// When the failure was observed.
    pub at: DateTime<Utc>,
    /// HTTP method.
    pub method: String,
    /// Target URL.
    pub url: String,
    /// Index of the racing chain (0-based).
    pub chain: u32,
    /// Attempt number within the chain (1-based).
    pub attempt: u32,
    /// What went wrong.
    pub error: String,
}

impl fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} chain={} attempt={}: {}",
            self.at.to_rfc3339(),
            self.method,
            self.url,
            self.chain,
            self.attempt,
            self.error
        )
    }
}

/// Bounded, thread-safe attempt log shared by all calls of one client.
#[derive(Debug, Default)]
pub struct AttemptLog {
    records: Mutex<VecDeque<AttemptRecord>>,
}

impl AttemptLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting the oldest one when full.
    pub fn push(&self, record: AttemptRecord) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records.len() == MAX_LOG_ENTRIES {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Copy of the current records, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AttemptRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// One line per record, oldest first.
    #[must_use]
    pub fn to_log_string(&self) -> String {
        self.snapshot()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
