//! JSON codec.
//!
//! Documents are wrapped in a single root key on the way out and unwrapped
//! on the way in: `{"person": {"id": 1}}` decodes to `{"id": 1}`.

use std::collections::BTreeMap;

use crate::formats::{FormatError, Value};

/// Decodes a JSON document, stripping a single-key root wrapper.
///
/// # Errors
///
/// Returns [`FormatError::Json`] when the body is not valid JSON.
pub fn decode(body: &[u8]) -> Result<Value, FormatError> {
    parse(body).map(remove_root)
}

/// Decodes a JSON document without touching its shape.
///
/// # Errors
///
/// Returns [`FormatError::Json`] when the body is not valid JSON.
pub fn parse(body: &[u8]) -> Result<Value, FormatError> {
    let parsed: serde_json::Value = serde_json::from_slice(body)?;
    Ok(Value::from(parsed))
}

/// Encodes a value, wrapping it as `{root: value}` unless `root` is empty.
///
/// # Errors
///
/// Returns [`FormatError::Json`] if serialization fails.
pub fn encode(value: &Value, root: &str) -> Result<Vec<u8>, FormatError> {
    let body = if root.is_empty() {
        serde_json::to_vec(value)?
    } else {
        let wrapped: BTreeMap<&str, &Value> = BTreeMap::from([(root, value)]);
        serde_json::to_vec(&wrapped)?
    };
    Ok(body)
}

/// Unwraps a map holding exactly one key; anything else is returned as is.
#[must_use]
pub fn remove_root(value: Value) -> Value {
    match value {
        Value::Map(map) if map.len() == 1 => map
            .into_values()
            .next()
            .unwrap_or(Value::Null),
        other => other,
    }
}
