//! API key wrapper.
//!
//! Keeps the conversion service key out of `Debug`/`Display` output so it
//! never ends up in logs or in the attempt log.

use std::fmt;

/// The key sent in the authentication header of every request.
///
/// # Example
///
/// ```
/// use sheetconv::config::ApiKey;
///
/// let key = ApiKey::new("mashape-key-123");
/// assert_eq!(format!("{key:?}"), "<REDACTED>");
/// assert_eq!(key.expose(), "mashape-key-123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw key, for building the request header only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true if no key was supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
