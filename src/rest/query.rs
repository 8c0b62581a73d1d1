//! Query string encoding.
//!
//! Options are flattened the way Rails parses nested parameters:
//!
//! - a list repeats its key with a `[]` suffix, once per element
//! - a map flattens to `key[subkey]` pairs, recursively
//! - anything else is rendered as text
//!
//! Keys and values are percent-encoded, so brackets appear as `%5B` and `%5D`.
//!
//! # Example
//!
//! ```rust
//! use active_resource::rest::{query_string, Params};
//! use active_resource::Value;
//!
//! let mut options = Params::new();
//! options.insert("vars".to_string(), Value::List(vec![Value::from("a"), Value::from("b")]));
//! assert_eq!(query_string(&options), "?vars%5B%5D=a&vars%5B%5D=b");
//! ```

use crate::formats::{Map, Value};

/// Options passed to finders and custom methods.
///
/// Keys named by a type's prefix template fill in the path; every other key
/// ends up in the query string.
pub type Params = Map;

/// Encodes options as `application/x-www-form-urlencoded` pairs.
#[must_use]
pub fn to_query(params: &Params) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten(key.clone(), value, &mut pairs);
    }
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Returns `""` for empty options, `"?"` followed by [`to_query`] otherwise.
#[must_use]
pub fn query_string(params: &Params) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", to_query(params))
    }
}

fn flatten(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::List(items) => {
            let key = format!("{key}[]");
            pairs.extend(items.iter().map(|item| (key.clone(), item.to_string())));
        }
        Value::Map(map) => {
            for (sub_key, sub_value) in map {
                flatten(format!("{key}[{sub_key}]"), sub_value, pairs);
            }
        }
        other => pairs.push((key, other.to_string())),
    }
}

fn encode(text: &str) -> String {
    urlencoding::encode(text).replace("%20", "+")
}
