//! sheetconv
//!
//! An async client for a remote JSON/XML to spreadsheet conversion API.
//!
//! # Features
//!
//! - Client-side validation of the four conversion options
//! - Per-client endpoint resolution from immutable templates
//! - Racing attempt chains with exponential-jitter backoff
//! - Per-attempt timeouts, call deadlines and cancellation
//! - Bounded diagnostic log of failed attempts
//!
//! Payloads and returned spreadsheets are passed through untouched.
//!
//! # Quick Start
//!
//! ```no_run
//! use sheetconv::client::Client;
//!
//! # async fn run() -> Result<(), sheetconv::error::Error> {
//! let client = Client::new_xml("XLSX", "Plain", "Portrait", "None", "my-api-key")?;
//! let workbook = client.convert_xml("<orders><order id=\"1\"/></orders>").await?;
//! assert!(!workbook.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! options ──▶ params::validate_params ──▶ endpoint::Endpoint ──┐
//!                                                            ▼
//! payload ─────────────────────────────▶ client::Client ──▶ conversion API
//!                                          │  ▲
//!                                          ▼  │ retry::RetryPolicy
//!                                      racing attempt chains
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod retry;

pub use client::Client;
pub use error::{ConfigError, ConvertError, Error};
pub use params::{ConversionOptions, Format, InternalIds, Layout, View};
