//! Collections returned by finders.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use crate::clients::first_header;
use crate::rest::record::Record;

/// The records of a collection response together with its headers.
///
/// Dereferences to the records. The headers stay available so callers can
/// follow pagination links:
///
/// ```rust,ignore
/// let page = person.find_all(&Params::new())?;
/// if let Some(link) = page.header("Link") {
///     println!("next page: {link}");
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct Collection {
    records: Vec<Record>,
    headers: HashMap<String, Vec<String>>,
}

impl Collection {
    /// Creates a collection.
    #[must_use]
    pub const fn new(records: Vec<Record>, headers: HashMap<String, Vec<String>>) -> Self {
        Self { records, headers }
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, Vec<String>> {
        &self.headers
    }

    /// Returns the first value of a response header, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }

    /// Returns the records.
    #[must_use]
    pub fn into_inner(self) -> Vec<Record> {
        self.records
    }
}

impl Deref for Collection {
    type Target = Vec<Record>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl DerefMut for Collection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.records
    }
}

impl IntoIterator for Collection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
