//! Conversion parameters and their validation.
//!
//! The remote service accepts four enumerated options. Each one is modelled
//! as an enum whose wire string is exactly what the service expects:
//!
//! | Option        | Allowed values                 |
//! |---------------|--------------------------------|
//! | `format`      | `XLSX`, `XLS`                  |
//! | `view`        | `Hierarchy`, `Plain`, `Both`   |
//! | `layout`      | `Auto`, `Portrait`, `Landscape`|
//! | `InternalIDs` | `Both`, `None`                 |
//!
//! # Example
//!
//! ```
//! use sheetconv::params::{validate_params, Format, Layout};
//!
//! let options = validate_params("XLSX", "Plain", "Landscape", "None").unwrap();
//! assert_eq!(options.format, Format::Xlsx);
//! assert_eq!(options.layout, Layout::Landscape);
//!
//! assert!(validate_params("CSV", "Plain", "Auto", "None").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Declares a closed set of wire values with `as_str`, `Display` and a
/// `FromStr` impl that rejects anything else with the given error variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident => $err:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every allowed value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The exact string sent to the conversion service.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(ConfigError::$err {
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Output spreadsheet format.
    Format => InvalidFormat {
        /// Office Open XML workbook.
        Xlsx = "XLSX",
        /// Legacy binary workbook.
        Xls = "XLS",
    }
}

wire_enum! {
    /// How nested records are laid out across sheets.
    View => InvalidView {
        /// One sheet per nesting level, linked by IDs.
        Hierarchy = "Hierarchy",
        /// Flattened into a single table.
        Plain = "Plain",
        /// Both renderings.
        Both = "Both",
    }
}

wire_enum! {
    /// Page orientation of the generated workbook.
    Layout => InvalidLayout {
        /// Chosen by the service.
        Auto = "Auto",
        /// Portrait orientation.
        Portrait = "Portrait",
        /// Landscape orientation.
        Landscape = "Landscape",
    }
}

wire_enum! {
    /// Whether unique internal IDs are generated for each JSON token (XML
    /// element). They help look up corresponding rows between sheets.
    InternalIds => InvalidInternalIds {
        /// Emit internal IDs.
        Both = "Both",
        /// Do not emit internal IDs.
        Neither = "None",
    }
}

/// A validated set of conversion options.
///
/// Only obtainable through [`validate_params`] or by composing the enums
/// directly, so every instance holds allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Output format.
    pub format: Format,
    /// Sheet view.
    pub view: View,
    /// Page layout. Ignored by the JSON endpoint.
    pub layout: Layout,
    /// Internal ID generation.
    #[serde(rename = "internalIDs")]
    pub internal_ids: InternalIds,
}

impl ConversionOptions {
    /// Create options from already-typed values.
    #[must_use]
    pub const fn new(format: Format, view: View, layout: Layout, internal_ids: InternalIds) -> Self {
        Self {
            format,
            view,
            layout,
            internal_ids,
        }
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new(Format::Xlsx, View::Hierarchy, Layout::Auto, InternalIds::Both)
    }
}

/// Validate the four raw option strings.
///
/// Checks run in the order format, view, layout, internalIDs and the first
/// failure is returned.
///
/// # Errors
///
/// Returns the [`ConfigError`] variant naming the first invalid parameter.
pub fn validate_params(
    format: &str,
    view: &str,
    layout: &str,
    internal_ids: &str,
) -> Result<ConversionOptions, ConfigError> {
    Ok(ConversionOptions {
        format: format.parse()?,
        view: view.parse()?,
        layout: layout.parse()?,
        internal_ids: internal_ids.parse()?,
    })
}
