//! The structured value model shared by the JSON and XML codecs.
//!
//! A [`Value`] is what a decoded payload looks like before it is turned into
//! records, and what a record looks like before it is encoded again. It is
//! richer than JSON: XML payloads carry typed scalars (decimals, dates,
//! binary data and file attachments) that survive a round trip.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// An ordered string-keyed map of values.
pub type Map = BTreeMap<String, Value>;

/// A file carried inside an XML document as base64 text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileAttachment {
    /// The decoded file contents.
    pub data: Vec<u8>,
    /// The file name, `untitled` when the document does not name one.
    pub name: String,
    /// The MIME type, `application/octet-stream` when unspecified.
    pub content_type: String,
}

impl FileAttachment {
    /// File name used when none is given.
    pub const DEFAULT_NAME: &'static str = "untitled";
    /// Content type used when none is given.
    pub const DEFAULT_CONTENT_TYPE: &'static str = "application/octet-stream";

    /// Creates an attachment with the default name and content type.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            name: Self::DEFAULT_NAME.to_string(),
            content_type: Self::DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Sets the file name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// A dynamically typed value.
///
/// Equality follows the variant: `Integer(1)` and `Float(1.0)` are
/// different values. Date-times compare by instant. Floats compare by bit
/// pattern, so `NaN` equals itself and `0.0` differs from `-0.0`.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// An absent value (`null` in JSON, `nil="true"` in XML).
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// An exact decimal number.
    Decimal(Decimal),
    /// A floating point number.
    Float(f64),
    /// Text.
    String(String),
    /// Raw bytes, base64 encoded on the wire.
    Binary(Vec<u8>),
    /// A point in time with its offset.
    DateTime(DateTime<FixedOffset>),
    /// A calendar date.
    Date(NaiveDate),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A string-keyed map.
    Map(Map),
    /// A file attachment.
    File(FileAttachment),
}

impl Value {
    /// Builds a map value from key/value pairs.
    ///
    /// ```rust
    /// use active_resource::Value;
    ///
    /// let value = Value::from_pairs([("name", Value::from("Matz")), ("id", Value::from(1))]);
    /// assert_eq!(value.get("name").and_then(Value::as_str), Some("Matz"));
    /// ```
    #[must_use]
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for null, empty strings, empty lists and empty maps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Binary(bytes) => bytes.is_empty(),
            _ => false,
        }
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number held by an integer value.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the flag held by a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the entries of a map value.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the items of a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Looks up a key in a map value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Returns the XML type tag for scalar values, if they carry one.
    #[must_use]
    pub const fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Bool(_) => Some("boolean"),
            Self::Integer(_) => Some("integer"),
            Self::Decimal(_) => Some("decimal"),
            Self::Float(_) => Some("float"),
            Self::Binary(_) => Some("base64Binary"),
            Self::DateTime(_) => Some("datetime"),
            Self::Date(_) => Some("date"),
            Self::File(_) => Some("file"),
            Self::List(_) => Some("array"),
            Self::Null | Self::String(_) | Self::Map(_) => None,
        }
    }
}

/// Renders the value the way it appears in URLs and XML text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => f.write_str(s),
            Self::Binary(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::File(file) => f.write_str(&file.name),
            Self::List(_) | Self::Map(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::File(a), Self::File(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Integer(i) => i.hash(state),
            Self::Decimal(d) => d.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::String(s) => s.hash(state),
            Self::Binary(bytes) => bytes.hash(state),
            Self::DateTime(dt) => dt.hash(state),
            Self::Date(date) => date.hash(state),
            Self::List(items) => items.hash(state),
            Self::Map(map) => map.hash(state),
            Self::File(file) => file.hash(state),
        }
    }
}

/// Serializes into the JSON data model.
///
/// Types JSON has no notation for become strings: decimals and dates use
/// their canonical text, binary data is base64 encoded.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            Self::Float(_) => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Decimal(_) | Self::Binary(_) | Self::DateTime(_) | Self::Date(_) => {
                serializer.collect_str(self)
            }
            Self::List(items) => serializer.collect_seq(items),
            Self::Map(map) => serializer.collect_map(map),
            Self::File(file) => {
                let mut entries = serializer.serialize_map(Some(3))?;
                entries.serialize_entry("name", &file.name)?;
                entries.serialize_entry("content_type", &file.content_type)?;
                entries.serialize_entry("data", &STANDARD.encode(&file.data))?;
                entries.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Decimal(Decimal::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Decimal(Decimal::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Self::String(s),
            serde_yaml::Value::Sequence(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Self::Map(
                mapping
                    .into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

// Non-string YAML keys are stringified.
fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "~".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i64 => Integer,
    i32 => Integer,
    u32 => Integer,
    f64 => Float,
    Decimal => Decimal,
    String => String,
    &str => String,
    NaiveDate => Date,
    DateTime<FixedOffset> => DateTime,
    Vec<Value> => List,
    Map => Map,
    FileAttachment => File,
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_from_json_maps_numbers_by_kind() {
        let value = Value::from(json!({"a": 1, "b": 1.5, "c": 18_446_744_073_709_551_615_u64}));
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));
        assert_eq!(value.get("b"), Some(&Value::Float(1.5)));
        assert_eq!(
            value.get("c"),
            Some(&Value::Decimal(Decimal::from(u64::MAX)))
        );
    }

    #[test]
    fn test_display_renders_url_text() {
        assert_eq!(Value::from(3.0).to_string(), "3.0");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(true).to_string(), "true");
        let date = NaiveDate::from_ymd_opt(2008, 9, 5).unwrap();
        assert_eq!(Value::from(date).to_string(), "2008-09-05");
    }

    #[test]
    fn test_serialize_turns_rich_scalars_into_strings() {
        let value = Value::from_pairs([
            ("price", Value::Decimal("1.50".parse().unwrap())),
            ("data", Value::Binary(b"hi".to_vec())),
            ("ratio", Value::Float(f64::INFINITY)),
        ]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({"price": "1.50", "data": "aGk=", "ratio": null}));
    }

    #[test]
    fn test_equal_values_hash_equal() {
        let a = Value::from(json!({"name": "Matz", "tags": ["x", 1.5]}));
        let b = Value::from(json!({"tags": ["x", 1.5], "name": "Matz"}));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_float_equality_agrees_with_hash() {
        let zero = Value::Float(0.0);
        let negative_zero = Value::Float(-0.0);
        assert_ne!(zero, negative_zero);

        let nan = Value::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(hash_of(&nan), hash_of(&nan.clone()));

        let set: std::collections::HashSet<Value> =
            [zero, negative_zero, nan.clone(), nan].into_iter().collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_integer_and_float_are_distinct() {
        assert_ne!(Value::Integer(1), Value::Float(1.0));
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::List(vec![]).is_empty());
        assert!(!Value::from(0).is_empty());
    }

    #[test]
    fn test_from_yaml_stringifies_keys() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\n:message: hi\n").unwrap();
        let value = Value::from(yaml);
        assert_eq!(value.get("1").and_then(Value::as_str), Some("one"));
        assert_eq!(value.get(":message").and_then(Value::as_str), Some("hi"));
    }

    #[test]
    fn test_file_attachment_defaults() {
        let file = FileAttachment::new(b"abc".to_vec());
        assert_eq!(file.name, "untitled");
        assert_eq!(file.content_type, "application/octet-stream");
    }
}
