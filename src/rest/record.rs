//! Records: instances of a resource type.
//!
//! A [`Record`] holds a string-keyed attribute map. Nested maps in decoded
//! documents become nested records whose type is found by class lookup on
//! the key name, and lists of maps become lists of records sharing one type.
//! Every write replaces the attribute's value whole.
//!
//! The record's state follows its id: without one it is new and `save`
//! creates it with POST; with one it is persisted and `save` updates it
//! with PUT.
//!
//! # Example
//!
//! ```rust,ignore
//! use active_resource::{Registry, Value};
//!
//! let registry = Registry::new();
//! let person = registry.define("shop", "Person").site("http://localhost").build()?;
//!
//! let mut matz = person.find(1, &Default::default())?;
//! matz.set("name", Value::from("Yukihiro"));
//! if !matz.save()? {
//!     for message in matz.errors().full_messages() {
//!         eprintln!("{message}");
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::clients::{ConnectionError, HttpResponse};
use crate::formats::{Format, FormatError, Value, XmlOptions};
use crate::rest::error_set::ErrorSet;
use crate::rest::errors::ResourceError;
use crate::rest::path::ResourcePath;
use crate::rest::query::Params;
use crate::rest::resource::ResourceType;

/// One attribute value of a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// A plain value.
    Value(Value),
    /// A nested record.
    Record(Record),
    /// A list of plain values and nested records.
    List(Vec<Attribute>),
}

impl Attribute {
    /// Converts back to a plain value, flattening nested records.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Record(record) => record.to_value(),
            Self::List(items) => Value::List(items.iter().map(Self::to_value).collect()),
        }
    }

    /// Returns the plain value, if this is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested record, if this is one.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }
}

impl From<Value> for Attribute {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Record> for Attribute {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Vec<Record>> for Attribute {
    fn from(records: Vec<Record>) -> Self {
        Self::List(records.into_iter().map(Self::Record).collect())
    }
}

impl From<Vec<Self>> for Attribute {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

macro_rules! attribute_from_scalar {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Attribute {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

attribute_from_scalar!(bool, i32, i64, f64, String, &str);

/// An instance of a resource type.
#[derive(Clone, Debug)]
pub struct Record {
    kind: ResourceType,
    attributes: BTreeMap<String, Attribute>,
    prefix_options: Params,
    errors: ErrorSet,
}

impl Record {
    /// Creates a record from a map of attributes.
    ///
    /// Values that are not maps are ignored.
    #[must_use]
    pub fn new(kind: &ResourceType, attributes: Value) -> Self {
        Self::from_value(kind, attributes, Params::new())
    }

    /// Creates a record with prefix options, e.g. the id of its parent.
    #[must_use]
    pub fn from_value(kind: &ResourceType, attributes: Value, prefix_options: Params) -> Self {
        let mut record = Self {
            kind: kind.clone(),
            attributes: BTreeMap::new(),
            prefix_options,
            errors: ErrorSet::new(),
        };
        record.update(attributes);
        record
    }

    /// Returns the record's type.
    #[must_use]
    pub const fn kind(&self) -> &ResourceType {
        &self.kind
    }

    /// Returns all attributes.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, Attribute> {
        &self.attributes
    }

    /// Returns one attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Returns one attribute for in-place changes.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(name)
    }

    /// Replaces one attribute.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Attribute>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Removes one attribute.
    pub fn remove(&mut self, name: &str) -> Option<Attribute> {
        self.attributes.remove(name)
    }

    /// Returns the value of the primary key attribute.
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.attributes
            .get(&self.kind.primary_key())
            .and_then(Attribute::as_value)
    }

    /// Sets the primary key attribute.
    pub fn set_id(&mut self, id: impl Into<Value>) {
        let key = self.kind.primary_key();
        self.attributes.insert(key, Attribute::Value(id.into()));
    }

    /// Returns `true` while the record has no id.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id().map_or(true, Value::is_empty)
    }

    /// Returns the values substituted into the prefix template for this
    /// record.
    #[must_use]
    pub const fn prefix_options(&self) -> &Params {
        &self.prefix_options
    }

    /// Returns the validation errors of the last save.
    #[must_use]
    pub const fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Returns the validation errors for changes.
    pub fn errors_mut(&mut self) -> &mut ErrorSet {
        &mut self.errors
    }

    /// Returns `true` if no validation errors are recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Replaces attributes from a decoded document.
    ///
    /// Each key of `attributes` replaces the attribute of the same name;
    /// other attributes are kept. Nested maps become records of the type
    /// found for the key. Maps inside a list become records of the type
    /// found for the singular form of the key. A non-map argument changes
    /// nothing.
    pub fn update(&mut self, attributes: Value) {
        let Value::Map(attributes) = attributes else {
            return;
        };
        for (key, value) in attributes {
            let attribute = match value {
                nested @ Value::Map(_) => {
                    let kind = self.kind.class_for_element(&key);
                    Attribute::Record(Self::new(&kind, nested))
                }
                Value::List(items) => {
                    let mut element_kind: Option<ResourceType> = None;
                    let items = items
                        .into_iter()
                        .map(|item| match item {
                            nested @ Value::Map(_) => {
                                let kind = element_kind
                                    .get_or_insert_with(|| self.kind.find_class_for_collection(&key));
                                Attribute::Record(Self::new(kind, nested))
                            }
                            other => Attribute::Value(other),
                        })
                        .collect();
                    Attribute::List(items)
                }
                other => Attribute::Value(other),
            };
            self.attributes.insert(key, attribute);
        }
    }

    // -- Serialization -----------------------------------------------------

    /// Converts the record to a plain map value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.attributes
                .iter()
                .map(|(key, attribute)| (key.clone(), attribute.to_value()))
                .collect(),
        )
    }

    /// Encodes the record as XML under `root`, or under the type's
    /// singular name when `root` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Xml`] if the writer fails.
    pub fn to_xml(&self, root: Option<&str>, options: XmlOptions) -> Result<Vec<u8>, FormatError> {
        let singular = self.kind.singular();
        crate::formats::xml::encode(&self.to_value(), root.unwrap_or(&singular), options)
    }

    /// Encodes the record as JSON wrapped in `root`, or in the type's
    /// singular name when `root` is `None`. An empty root disables the
    /// wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Json`] if serialization fails.
    pub fn to_json(&self, root: Option<&str>) -> Result<Vec<u8>, FormatError> {
        let singular = self.kind.singular();
        crate::formats::json::encode(&self.to_value(), root.unwrap_or(&singular))
    }

    /// Encodes the record in its type's format.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        self.kind
            .format()
            .encode(&self.to_value(), &self.kind.singular())
    }

    // -- Persistence -------------------------------------------------------

    fn id_segment(&self) -> String {
        self.id().map(ToString::to_string).unwrap_or_default()
    }

    fn element_path(&self) -> String {
        self.kind
            .element_path(self.id_segment(), &self.prefix_options, &Params::new())
    }

    /// Saves the record: POST when new, PUT otherwise.
    ///
    /// After a create, an id found in the `Location` header is assigned.
    /// Attributes in the response body replace the local ones. A body that
    /// is empty or does not decode leaves them unchanged.
    ///
    /// Returns `Ok(false)` when the service rejects the record with 422;
    /// the reasons are then available from [`Record::errors`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for every other failure.
    pub fn save(&mut self) -> Result<bool, ResourceError> {
        self.errors.clear();
        let connection = self.kind.connection()?;
        let headers = self.kind.headers();
        let body = self.encode()?;

        let result = if self.is_new() {
            let path = self
                .kind
                .collection_path(&self.prefix_options, &Params::new());
            connection.post(&path, &headers, &body)
        } else {
            connection.put(&self.element_path(), &headers, &body)
        };

        let response = match result {
            Ok(response) => response,
            Err(ConnectionError::ResourceInvalid(error)) => {
                self.load_errors(&error.response.body);
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        };

        if self.is_new() {
            if let Some(id) = response.header("Location").and_then(id_from_location) {
                self.set_id(id);
            }
        }

        match self.kind.format().decode(&response.body) {
            Ok(attributes) if !attributes.is_empty() => self.update(attributes),
            Ok(_) => {}
            Err(err) => tracing::debug!("save response carried no attributes: {err}"),
        }
        Ok(true)
    }

    fn load_errors(&mut self, body: &[u8]) {
        match self.kind.format() {
            Format::Xml => self.errors.from_xml(body, &self.attributes),
            Format::Json => self.errors.from_json(body, &self.attributes),
        }
    }

    /// Deletes the record on the service. The local record is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn destroy(&self) -> Result<(), ResourceError> {
        self.kind
            .connection()?
            .delete(&self.element_path(), &self.kind.headers())?;
        Ok(())
    }

    /// Fetches the record again and replaces its attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn reload(&mut self) -> Result<(), ResourceError> {
        let attributes = self.kind.get_decoded(&self.element_path())?;
        self.update(attributes);
        Ok(())
    }

    // -- Custom element methods --------------------------------------------

    // Prefix options of the call, overridden by the record's own.
    fn custom_path(&self, options: &Params) -> (ResourcePath, Params) {
        let (mut prefix_options, query) = self.kind.split_options(options);
        prefix_options.extend(self.prefix_options.clone());
        (self.kind.resource_path(&prefix_options), query)
    }

    fn custom_element_path(&self, method: &str, options: &Params) -> String {
        let (path, query) = self.custom_path(options);
        path.custom_element(self.id_segment(), method, &query)
    }

    /// GETs `<prefix>/<plural>/<id>/<method>.<ext>` and decodes the body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn custom_get(&self, method: &str, options: &Params) -> Result<Value, ResourceError> {
        self.kind
            .get_decoded(&self.custom_element_path(method, options))
    }

    /// POSTs to a custom method of the record.
    ///
    /// For a new record the request goes to
    /// `<prefix>/<plural>/new/<method>.<ext>`, and an empty `body` is
    /// replaced by the encoded record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if encoding or the request fails.
    pub fn custom_post(&self, method: &str, body: &[u8], options: &Params) -> Result<HttpResponse, ResourceError> {
        let connection = self.kind.connection()?;
        let headers = self.kind.headers();
        if !self.is_new() {
            let path = self.custom_element_path(method, options);
            return Ok(connection.post(&path, &headers, body)?);
        }

        let (path, query) = self.custom_path(options);
        let path = path.custom_new_element(method, &query);
        let encoded;
        let body = if body.is_empty() {
            encoded = self.encode()?;
            encoded.as_slice()
        } else {
            body
        };
        Ok(connection.post(&path, &headers, body)?)
    }

    /// PUTs to a custom method of the record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn custom_put(&self, method: &str, body: &[u8], options: &Params) -> Result<HttpResponse, ResourceError> {
        let path = self.custom_element_path(method, options);
        Ok(self.kind.connection()?.put(&path, &self.kind.headers(), body)?)
    }

    /// Sends DELETE to a custom method of the record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn custom_delete(&self, method: &str, options: &Params) -> Result<HttpResponse, ResourceError> {
        let path = self.custom_element_path(method, options);
        Ok(self.kind.connection()?.delete(&path, &self.kind.headers())?)
    }

    /// Sends HEAD to a custom method of the record.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn custom_head(&self, method: &str, options: &Params) -> Result<HttpResponse, ResourceError> {
        let path = self.custom_element_path(method, options);
        Ok(self.kind.connection()?.head(&path, &self.kind.headers())?)
    }
}

/// Reads the id from a `Location` header: the last path segment without
/// its extension, as an integer when it is one.
fn id_from_location(location: &str) -> Option<Value> {
    let (_, segment) = location.rsplit_once('/')?;
    let segment = match segment.rsplit_once('.') {
        Some((stem, extension))
            if !extension.is_empty()
                && extension.chars().all(|c| c.is_alphanumeric() || c == '_') =>
        {
            stem
        }
        _ => segment,
    };
    if segment.is_empty() {
        return None;
    }
    Some(
        segment
            .parse::<i64>()
            .map_or_else(|_| Value::from(segment), Value::from),
    )
}

/// Records are equal when they have the same type, id and prefix options.
/// Other attributes are not compared.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.id() == other.id()
            && self.prefix_options == other.prefix_options
    }
}

impl Eq for Record {}

/// Hashes the fields [`PartialEq`] compares: type, id and prefix options.
///
/// The other attributes are left out so that equal records always hash
/// equally, even after one of them has been modified locally. Two records
/// with identical attribute maps still hash the same.
impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.qualified_name().hash(state);
        self.id().hash(state);
        self.prefix_options.hash(state);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.singular(), self.id_segment())
    }
}
