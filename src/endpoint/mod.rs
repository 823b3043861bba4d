//! Conversion endpoint resolution.
//!
//! Each client resolves its endpoint exactly once, at construction, from an
//! immutable template. The resolved URL is owned by the client, so clients
//! with different options never see each other's parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::params::ConversionOptions;

/// JSON conversion template. Layout is fixed to `Auto` for JSON input.
pub const JSON_TEMPLATE: &str =
    "/ConvertJsonRaw?format={format}&layout=Auto&view={view}&InternalIDs={internalIDs}";

/// XML conversion template.
pub const XML_TEMPLATE: &str =
    "/ConvertXmlRaw?format={format}&layout={layout}&view={view}&InternalIDs={internalIDs}";

/// Kind of payload a client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// JSON text.
    Json,
    /// XML text.
    Xml,
}

impl PayloadKind {
    /// URL template for this payload kind.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::Json => JSON_TEMPLATE,
            Self::Xml => XML_TEMPLATE,
        }
    }

    /// `Content-Type` header value.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// `Accept` header value, if one is sent.
    #[must_use]
    pub const fn accept(self) -> Option<&'static str> {
        match self {
            Self::Json => Some("application/json"),
            Self::Xml => None,
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Xml => f.write_str("xml"),
        }
    }
}

/// Substitute the option placeholders of `template`.
///
/// Placeholders absent from the template are simply not used.
#[must_use]
pub fn render_template(template: &str, options: &ConversionOptions) -> String {
    template
        .replace("{format}", options.format.as_str())
        .replace("{view}", options.view.as_str())
        .replace("{layout}", options.layout.as_str())
        .replace("{internalIDs}", options.internal_ids.as_str())
}

/// A fully resolved conversion URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    kind: PayloadKind,
    url: String,
}

impl Endpoint {
    /// Resolve the endpoint for `kind` against `base_url`.
    #[must_use]
    pub fn resolve(kind: PayloadKind, base_url: &str, options: &ConversionOptions) -> Self {
        let base = base_url.trim_end_matches('/');
        let url = format!("{base}{}", render_template(kind.template(), options));
        Self { kind, url }
    }

    /// Payload kind this endpoint converts.
    #[must_use]
    pub const fn kind(&self) -> PayloadKind {
        self.kind
    }

    /// The resolved URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}
