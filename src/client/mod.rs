//! Conversion client.
//!
//! This module provides:
//! - [`Client`], bound to one payload kind and one set of options
//! - Retrying transport with racing attempt chains
//! - Deadline and cancellation support
//!
//! # Example
//!
//! ```no_run
//! use sheetconv::client::Client;
//!
//! # async fn run() -> Result<(), sheetconv::error::Error> {
//! let client = Client::new_json("XLSX", "Hierarchy", "Auto", "Both", "my-api-key")?;
//! let workbook = client.convert_json(r#"[{"name":"a","qty":1}]"#).await?;
//! std::fs::write("out.xlsx", workbook).ok();
//! # Ok(())
//! # }
//! ```

mod transport;

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use crate::config::{validate_config, ApiKey, ClientConfig};
use crate::endpoint::{Endpoint, PayloadKind};
use crate::error::{ConfigError, ConvertError};
use crate::params::{validate_params, ConversionOptions};
use crate::retry::{AttemptLog, AttemptRecord};

/// Client for the JSON/XML to spreadsheet conversion API.
///
/// The endpoint is resolved once at construction and never changes. The
/// client is `Send + Sync`; share it behind an `Arc` to convert from many
/// tasks.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    api_key: ApiKey,
    options: ConversionOptions,
    endpoint: Endpoint,
    config: ClientConfig,
    log: AttemptLog,
}

impl Client {
    /// Create a client for JSON payloads with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid option.
    pub fn new_json(
        format: &str,
        view: &str,
        layout: &str,
        internal_ids: &str,
        api_key: impl Into<ApiKey>,
    ) -> Result<Self, ConfigError> {
        let options = validate_params(format, view, layout, internal_ids)?;
        Self::with_config(PayloadKind::Json, options, api_key, ClientConfig::default())
    }

    /// Create a client for XML payloads with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid option.
    pub fn new_xml(
        format: &str,
        view: &str,
        layout: &str,
        internal_ids: &str,
        api_key: impl Into<ApiKey>,
    ) -> Result<Self, ConfigError> {
        let options = validate_params(format, view, layout, internal_ids)?;
        Self::with_config(PayloadKind::Xml, options, api_key, ClientConfig::default())
    }

    /// Create a client from typed options and explicit transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for out-of-range settings and
    /// [`ConfigError::HttpClient`] if the HTTP client cannot be created.
    pub fn with_config(
        kind: PayloadKind,
        options: ConversionOptions,
        api_key: impl Into<ApiKey>,
        config: ClientConfig,
    ) -> Result<Self, ConfigError> {
        validate_config(&config)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConfigError::HttpClient {
                message: e.to_string(),
            })?;

        let endpoint = Endpoint::resolve(kind, &config.base_url, &options);
        tracing::debug!(kind = %kind, endpoint = %endpoint, "Conversion client created");

        Ok(Self {
            http,
            api_key: api_key.into(),
            options,
            endpoint,
            config,
            log: AttemptLog::new(),
        })
    }

    /// Payload kind this client converts.
    #[must_use]
    pub const fn kind(&self) -> PayloadKind {
        self.endpoint.kind()
    }

    /// The resolved conversion endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The validated conversion options.
    #[must_use]
    pub const fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// The transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Convert a JSON payload and return the spreadsheet bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError`] if the request cannot be built, every
    /// attempt fails, the body cannot be read, or the deadline elapses.
    pub async fn convert_json(&self, payload: impl Into<Vec<u8>>) -> Result<Vec<u8>, ConvertError> {
        self.convert(PayloadKind::Json, payload.into()).await
    }

    /// Convert an XML payload and return the spreadsheet bytes.
    ///
    /// # Errors
    ///
    /// See [`Client::convert_json`].
    pub async fn convert_xml(&self, payload: impl Into<Vec<u8>>) -> Result<Vec<u8>, ConvertError> {
        self.convert(PayloadKind::Xml, payload.into()).await
    }

    /// [`Client::convert_json`] that stops early when `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Cancelled`] on cancellation, otherwise see
    /// [`Client::convert_json`].
    pub async fn convert_json_cancellable(
        &self,
        payload: impl Into<Vec<u8>>,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, ConvertError> {
        self.convert_cancellable(PayloadKind::Json, payload.into(), token)
            .await
    }

    /// [`Client::convert_xml`] that stops early when `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Cancelled`] on cancellation, otherwise see
    /// [`Client::convert_json`].
    pub async fn convert_xml_cancellable(
        &self,
        payload: impl Into<Vec<u8>>,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, ConvertError> {
        self.convert_cancellable(PayloadKind::Xml, payload.into(), token)
            .await
    }

    /// Failed attempts recorded so far, oldest first.
    #[must_use]
    pub fn attempt_log(&self) -> Vec<AttemptRecord> {
        self.log.snapshot()
    }

    /// The attempt log rendered one record per line.
    #[must_use]
    pub fn log_string(&self) -> String {
        self.log.to_log_string()
    }

    /// Forget all recorded attempts.
    pub fn clear_log(&self) {
        self.log.clear();
    }

    async fn convert_cancellable(
        &self,
        kind: PayloadKind,
        payload: Vec<u8>,
        token: &CancellationToken,
    ) -> Result<Vec<u8>, ConvertError> {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                tracing::debug!(endpoint = %self.endpoint, "Conversion cancelled");
                Err(ConvertError::Cancelled)
            }
            result = self.convert(kind, payload) => result,
        }
    }

    async fn convert(&self, kind: PayloadKind, payload: Vec<u8>) -> Result<Vec<u8>, ConvertError> {
        let call = self.execute(kind, payload);
        match self.config.deadline_ms {
            Some(deadline_ms) => tokio::time::timeout(Duration::from_millis(deadline_ms), call)
                .await
                .map_err(|_| {
                    tracing::warn!(endpoint = %self.endpoint, deadline_ms, "Conversion deadline exceeded");
                    ConvertError::DeadlineExceeded { deadline_ms }
                })?,
            None => call.await,
        }
    }

    async fn execute(&self, kind: PayloadKind, payload: Vec<u8>) -> Result<Vec<u8>, ConvertError> {
        if kind != self.kind() {
            return Err(ConvertError::RequestBuild {
                message: format!(
                    "client is configured for {} payloads, not {kind}",
                    self.kind()
                ),
            });
        }

        let mut builder = self
            .http
            .post(self.endpoint.url())
            .header(self.config.api_key_header.as_str(), self.api_key.expose())
            .header(CONTENT_TYPE, kind.content_type());
        if let Some(accept) = kind.accept() {
            builder = builder.header(ACCEPT, accept);
        }

        let request = builder
            .body(payload)
            .build()
            .map_err(|e| ConvertError::RequestBuild {
                message: e.to_string(),
            })?;

        transport::execute(&self.http, &request, &self.config.retry, &self.log).await
    }
}
