//! Errors raised by the wire format codecs.

use thiserror::Error;

/// A payload could not be decoded (or, for JSON, encoded).
#[derive(Debug, Error)]
pub enum FormatError {
    /// The body was empty where a document was required.
    #[error("Cannot decode an empty document")]
    Empty,

    /// The body is not valid UTF-8.
    #[error("Document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body is not well-formed JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is not well-formed XML.
    #[error("Invalid XML: {message}")]
    Xml {
        /// Parser diagnostic.
        message: String,
    },

    /// A typed XML element holds text that does not parse as its type.
    #[error("Cannot parse '{text}' as {type_name} in element <{element}>")]
    InvalidScalar {
        /// The element name.
        element: String,
        /// The declared `type` attribute.
        type_name: String,
        /// The offending text.
        text: String,
    },

    /// An element declared as `type="yaml"` holds invalid YAML.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FormatError {
    pub(crate) fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_scalar_message_names_element_and_type() {
        let error = FormatError::InvalidScalar {
            element: "id".to_string(),
            type_name: "integer".to_string(),
            text: "abc".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("<id>"));
        assert!(message.contains("integer"));
        assert!(message.contains("'abc'"));
    }

    #[test]
    fn test_json_error_converts() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: FormatError = parse_error.into();
        assert!(matches!(error, FormatError::Json(_)));
    }
}
