//! Wire formats.
//!
//! Resources talk to their services in one of two formats. Each format
//! knows its file extension (appended to every resource path), its MIME
//! type (sent as `Content-Type` with request bodies) and how to turn bodies
//! into [`Value`]s and back.
//!
//! - [`json`]: root-wrapped JSON documents
//! - [`xml`]: Rails-style typed XML documents
//!
//! # Example
//!
//! ```rust
//! use active_resource::{Format, Value};
//!
//! let decoded = Format::Xml
//!     .decode(br#"<person><id type="integer">1</id><name>Matz</name></person>"#)
//!     .unwrap();
//! assert_eq!(decoded.get("id"), Some(&Value::Integer(1)));
//! assert_eq!(Format::Xml.extension(), "xml");
//! ```

mod errors;
pub mod json;
mod value;
pub mod xml;

use std::fmt;

pub use errors::FormatError;
pub use value::{FileAttachment, Map, Value};
pub use xml::XmlOptions;

/// A wire format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `application/xml`, paths end in `.xml`.
    Xml,
    /// `application/json`, paths end in `.json`.
    #[default]
    Json,
}

impl Format {
    /// Returns the path extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }

    /// Returns the MIME type used for request bodies.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Xml => "application/xml",
            Self::Json => "application/json",
        }
    }

    /// Decodes a response body, dropping the document's root wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the body is malformed.
    pub fn decode(self, body: &[u8]) -> Result<Value, FormatError> {
        tracing::debug!(format = %self, bytes = body.len(), "decoding response body");
        match self {
            Self::Xml => xml::decode(body, true),
            Self::Json => json::decode(body),
        }
    }

    /// Encodes a value as a request body wrapped in `root`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if serialization fails.
    pub fn encode(self, value: &Value, root: &str) -> Result<Vec<u8>, FormatError> {
        tracing::debug!(format = %self, root, "encoding request body");
        match self {
            Self::Xml => xml::encode(value, root, XmlOptions::default()),
            Self::Json => json::encode(value, root),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
