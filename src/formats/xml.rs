//! XML codec.
//!
//! Decoding reads a document into a small element tree and converts that
//! tree into a [`Value`], honouring the `type` and `nil` attributes that
//! Rails-style services put on elements:
//!
//! ```xml
//! <person>
//!   <id type="integer">1</id>
//!   <born-on type="date">1965-04-14</born-on>
//!   <parent-id nil="true" />
//!   <addresses type="array">
//!     <address><city>Tokyo</city></address>
//!   </addresses>
//! </person>
//! ```
//!
//! Encoding walks a [`Value`] the other way, dasherizing element names and
//! tagging scalars with their type.

use std::collections::btree_map::Entry;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;

use crate::formats::{FileAttachment, FormatError, Map, Value};
use crate::inflector::{dasherize, singularize};

/// Options controlling XML encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XmlOptions {
    /// Indent nested elements by two spaces per level.
    pub pretty: bool,
    /// Emit the `<?xml ...?>` declaration.
    pub header: bool,
    /// Replace underscores in element names with dashes.
    pub dasherize: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            header: true,
            dasherize: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.push((key.to_string(), value.into()));
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes an XML document.
///
/// With `strip_root` the root element's own name is dropped, so
/// `<person><id type="integer">1</id></person>` decodes to `{"id": 1}`.
/// Without it the result is wrapped as `{"person": {"id": 1}}`.
///
/// A document holding only whitespace decodes to an empty map.
///
/// # Errors
///
/// Returns [`FormatError::Empty`] for an empty body, [`FormatError::Xml`]
/// for malformed documents and [`FormatError::InvalidScalar`] when a typed
/// element holds unparseable text.
pub fn decode(body: &[u8], strip_root: bool) -> Result<Value, FormatError> {
    if body.is_empty() {
        return Err(FormatError::Empty);
    }
    let text = std::str::from_utf8(body)?;
    if text.trim().is_empty() {
        return Ok(Value::Map(Map::new()));
    }
    let root = parse_document(text)?;
    decode_element(&root, !strip_root)
}

fn parse_document(text: &str) -> Result<Element, FormatError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(open_element(&start)?),
            Ok(Event::Empty(start)) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FormatError::xml("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(content)) => {
                let text = content
                    .decode()
                    .map_err(|err| FormatError::xml(err.to_string()))?;
                append_text(&mut stack, &text)?;
            }
            Ok(Event::CData(content)) => {
                append_text(&mut stack, &String::from_utf8_lossy(&content))?;
            }
            Ok(Event::GeneralRef(reference)) => {
                append_text(&mut stack, &resolve_reference(&reference)?)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(FormatError::xml(format!(
                    "{err} at position {}",
                    reader.buffer_position()
                )))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(FormatError::xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| FormatError::xml("document has no root element"))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, FormatError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| FormatError::xml(err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attribute.value);
        let value = unescape(&raw).map_err(|err| FormatError::xml(err.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FormatError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_some() {
        return Err(FormatError::xml("document has more than one root element"));
    } else {
        *root = Some(element);
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(element) => element.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(FormatError::xml("text outside of the root element")),
    }
    Ok(())
}

// Character references resolve to their code point; everything else must be
// one of the five predefined entities.
fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, FormatError> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|err| FormatError::xml(err.to_string()))?
    {
        return Ok(ch.to_string());
    }
    let name = reference
        .decode()
        .map_err(|err| FormatError::xml(err.to_string()))?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| FormatError::xml(format!("unknown entity &{name};")))
}

fn decode_element(element: &Element, save_root: bool) -> Result<Value, FormatError> {
    let type_name = element.attribute("type").unwrap_or_default().to_lowercase();
    let tag = element.name.replace('-', "_");

    if type_name == "array" {
        let items = element
            .children
            .iter()
            .map(|child| decode_element(child, false))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(wrap(save_root, tag, Value::List(items)));
    }
    if element.attribute("nil") == Some("true") {
        return Ok(Value::Null);
    }

    let text = element.text.as_str();
    let trimmed = text.trim();
    let numeric_like = matches!(
        type_name.as_str(),
        "integer" | "datetime" | "date" | "decimal" | "double" | "float"
    );
    if numeric_like && trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let invalid = || FormatError::InvalidScalar {
        element: element.name.clone(),
        type_name: type_name.clone(),
        text: text.to_string(),
    };

    let value = match type_name.as_str() {
        "integer" => Value::Integer(trimmed.parse().map_err(|_| invalid())?),
        "datetime" => Value::DateTime(parse_datetime(trimmed).ok_or_else(invalid)?),
        "date" => Value::Date(
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid())?,
        ),
        "decimal" => Value::Decimal(Decimal::from_str(trimmed).map_err(|_| invalid())?),
        "float" | "double" => Value::Float(trimmed.parse().map_err(|_| invalid())?),
        "boolean" => Value::Bool(matches!(trimmed, "true" | "1")),
        "yaml" => {
            let parsed: serde_yaml::Value = serde_yaml::from_str(text)?;
            Value::from(parsed)
        }
        "base64binary" => Value::Binary(decode_base64(text).ok_or_else(invalid)?),
        "file" => Value::File(FileAttachment {
            data: decode_base64(text).ok_or_else(invalid)?,
            name: element
                .attribute("name")
                .unwrap_or(FileAttachment::DEFAULT_NAME)
                .to_string(),
            content_type: element
                .attribute("content_type")
                .unwrap_or(FileAttachment::DEFAULT_CONTENT_TYPE)
                .to_string(),
        }),
        "symbol" | "string" => Value::String(text.to_string()),
        _ => return decode_structure(element, tag, save_root),
    };
    Ok(value)
}

// Untyped (or unknown-typed) elements: children become a map seeded with the
// element's attributes, repeated child names collapse into lists.
fn decode_structure(element: &Element, tag: String, save_root: bool) -> Result<Value, FormatError> {
    if !element.children.is_empty() {
        let mut map: Map = element
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        for child in &element.children {
            let value = decode_element(child, false)?;
            match map.entry(child.name.replace('-', "_")) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(mut slot) => match slot.get_mut() {
                    Value::List(items) => items.push(value),
                    existing => {
                        let first = std::mem::take(existing);
                        *existing = Value::List(vec![first, value]);
                    }
                },
            }
        }
        return Ok(wrap(save_root, tag, Value::Map(map)));
    }

    if !element.attributes.is_empty() {
        return Ok(Value::Map(
            element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        ));
    }

    if element.text.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::String(element.text.clone()))
    }
}

fn wrap(save_root: bool, tag: String, value: Value) -> Value {
    if save_root {
        Value::Map(Map::from([(tag, value)]))
    } else {
        value
    }
}

fn decode_base64(text: &str) -> Option<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).ok()
}

/// Parses the date-time notations found in XML payloads.
///
/// RFC 3339 is tried first, then ISO 8601 variants without a colon in the
/// offset, without seconds, or without any offset (taken as UTC).
#[must_use]
pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    const WITH_OFFSET: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%d %H:%M:%S%z",
        "%Y-%m-%d %H:%M:%S %z",
    ];
    const NAIVE: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed);
    }
    if let Some(parsed) = WITH_OFFSET
        .iter()
        .find_map(|format| DateTime::parse_from_str(text, format).ok())
    {
        return Some(parsed);
    }
    let stripped = text.strip_suffix('Z').unwrap_or(text);
    NAIVE
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(stripped, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes a value as an XML document whose root element is `root`.
///
/// Lists become `type="array"` elements whose children are named after the
/// singular form of the list's name; maps become one child element per key;
/// null becomes an empty element with `nil="true"`.
///
/// # Errors
///
/// Returns [`FormatError::Xml`] if the writer fails.
pub fn encode(value: &Value, root: &str, options: XmlOptions) -> Result<Vec<u8>, FormatError> {
    let element = build_element(value, root, options.dasherize);
    let mut writer = if options.pretty {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };
    if options.header {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
    }
    write_element(&mut writer, &element)?;
    Ok(writer.into_inner())
}

fn build_element(value: &Value, name: &str, dasherize_names: bool) -> Element {
    let tag = if dasherize_names {
        dasherize(name)
    } else {
        name.to_string()
    };
    let mut element = Element::new(tag);

    match value {
        Value::List(items) => {
            element.set_attribute("type", "array");
            let child_name = singularize(&element.name);
            element.children = items
                .iter()
                .map(|item| build_element(item, &child_name, dasherize_names))
                .collect();
        }
        Value::Map(map) => {
            element.children = map
                .iter()
                .map(|(key, item)| build_element(item, key, dasherize_names))
                .collect();
        }
        Value::Null => element.set_attribute("nil", "true"),
        Value::File(file) => {
            element.set_attribute("type", "file");
            element.set_attribute("name", file.name.clone());
            element.set_attribute("content_type", file.content_type.clone());
            element.text = STANDARD.encode(&file.data);
        }
        Value::String(s) => element.text.clone_from(s),
        scalar => {
            if let Some(type_name) = scalar.type_name() {
                element.set_attribute("type", type_name);
            }
            element.text = scalar.to_string();
        }
    }
    element
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), FormatError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    if element.children.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&element.text)))
            .map_err(write_error)?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)
}

fn write_error(err: std::io::Error) -> FormatError {
    FormatError::xml(err.to_string())
}
