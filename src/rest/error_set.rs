//! Validation errors attached to a record.
//!
//! When a service rejects a save with 422, the response body lists what was
//! wrong. [`ErrorSet`] collects those messages per attribute; messages that
//! do not belong to a known attribute are filed under `base`.
//!
//! Services report errors in several shapes, all of which are accepted:
//!
//! ```text
//! <errors><error>Name can't be blank</error></errors>      XML list
//! {"errors": {"name": ["can't be blank"]}}                 JSON map
//! {"errors": ["Name can't be blank"]}                      JSON list
//! {"name": ["can't be blank"]}                             legacy JSON map
//! ```
//!
//! Full-sentence messages ("Name can't be blank") are attributed by their
//! first word: `Name` is underscored to `name`, and if the record has such
//! an attribute the rest of the sentence is filed under it.

use std::collections::BTreeMap;

use crate::formats::{json, xml, Value};
use crate::inflector::underscore;

/// Key for messages that concern the record as a whole.
pub const BASE: &str = "base";

/// The messages filed under one attribute.
///
/// Mirrors how messages are usually displayed: a single message stands
/// alone, several are listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorMessages<'a> {
    /// Exactly one message.
    Single(&'a str),
    /// Zero or more than one message.
    Multiple(&'a [String]),
}

/// Validation messages keyed by attribute name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorSet {
    errors: BTreeMap<String, Vec<String>>,
}

impl ErrorSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of attributes with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Alias of [`ErrorSet::len`].
    #[must_use]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns `true` when no errors are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds a message to an attribute.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Adds a message concerning the record as a whole.
    pub fn add_to_base(&mut self, message: impl Into<String>) {
        self.add(BASE, message);
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Returns the messages for an attribute.
    #[must_use]
    pub fn on(&self, attribute: &str) -> ErrorMessages<'_> {
        match self.errors.get(attribute).map(Vec::as_slice) {
            Some([single]) => ErrorMessages::Single(single),
            Some(messages) => ErrorMessages::Multiple(messages),
            None => ErrorMessages::Multiple(&[]),
        }
    }

    /// Returns the messages for an attribute as a slice.
    #[must_use]
    pub fn messages_for(&self, attribute: &str) -> &[String] {
        self.errors
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns every message, prefixed with its attribute name unless it
    /// was filed under `base`.
    #[must_use]
    pub fn full_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flat_map(|(attribute, messages)| {
                messages.iter().map(move |message| {
                    if attribute == BASE {
                        message.clone()
                    } else {
                        format!("{attribute} {message}")
                    }
                })
            })
            .collect()
    }

    /// Returns the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    /// Files full-sentence messages by their first word.
    pub fn from_array<V>(&mut self, messages: &[String], attributes: &BTreeMap<String, V>) {
        for message in messages {
            let trimmed = message.trim_start();
            let (first, rest) = trimmed
                .split_once(char::is_whitespace)
                .unwrap_or((trimmed, ""));
            let key = underscore(first);
            if !first.is_empty() && attributes.contains_key(&key) {
                self.add(key, rest.trim_start());
            } else {
                self.add_to_base(message.clone());
            }
        }
    }

    /// Files messages from an attribute-to-messages map. Unknown attributes
    /// go to `base`.
    pub fn from_hash<V>(&mut self, messages: &BTreeMap<String, Value>, attributes: &BTreeMap<String, V>) {
        for (key, value) in messages {
            for message in message_list(value) {
                if attributes.contains_key(key) {
                    self.add(key.clone(), message);
                } else {
                    self.add_to_base(message);
                }
            }
        }
    }

    /// Reads an `<errors><error>..</error></errors>` document.
    ///
    /// Malformed documents are logged and yield no messages.
    pub fn from_xml<V>(&mut self, body: &[u8], attributes: &BTreeMap<String, V>) {
        let messages = match xml::decode(body, false) {
            Ok(document) => document
                .get("errors")
                .and_then(|errors| errors.get("error"))
                .map(message_list)
                .unwrap_or_default(),
            Err(err) => {
                tracing::warn!("ignoring undecodable XML error document: {err}");
                Vec::new()
            }
        };
        self.from_array(&messages, attributes);
    }

    /// Reads a JSON error document in any of the supported shapes.
    pub fn from_json<V>(&mut self, body: &[u8], attributes: &BTreeMap<String, V>) {
        let decoded = json::parse(body).unwrap_or_else(|err| {
            tracing::warn!("ignoring undecodable JSON error document: {err}");
            Value::Null
        });
        match decoded {
            Value::Map(map) if map.contains_key("errors") => match map.get("errors") {
                Some(Value::List(items)) => {
                    let messages: Vec<String> = items.iter().map(ToString::to_string).collect();
                    self.from_array(&messages, attributes);
                }
                Some(Value::Map(by_attribute)) => self.from_hash(by_attribute, attributes),
                Some(Value::Null) | None => {}
                Some(other) => self.add_to_base(other.to_string()),
            },
            Value::Map(legacy) => self.from_hash(&legacy, attributes),
            Value::List(items) => {
                let messages: Vec<String> = items.iter().map(ToString::to_string).collect();
                self.from_array(&messages, attributes);
            }
            Value::Null => {}
            other if other.is_empty() => {}
            other => self.add_to_base(other.to_string()),
        }
    }
}

fn message_list(value: &Value) -> Vec<String> {
    match value {
        Value::List(items) => items.iter().map(ToString::to_string).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
