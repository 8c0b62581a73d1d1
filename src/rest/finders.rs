//! Class-level operations of a resource type.
//!
//! Paths, finders and custom collection methods. Options passed to these
//! methods are split per call: keys named by the type's prefix template
//! fill in the path, everything else goes into the query string.
//!
//! # Example
//!
//! ```rust,ignore
//! use active_resource::{Params, Registry, Value};
//!
//! let registry = Registry::new();
//! let comment = registry
//!     .define("blog", "Comment")
//!     .site("http://localhost/posts/$post_id/")
//!     .build()?;
//!
//! let mut options = Params::new();
//! options.insert("post_id".to_string(), Value::from(5));
//! options.insert("order".to_string(), Value::from("recent"));
//!
//! // GET posts/5/comments.json?order=recent
//! let comments = comment.find_all(&options)?;
//! for record in comments.iter() {
//!     println!("{record}");
//! }
//! ```

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::clients::HttpResponse;
use crate::formats::Value;
use crate::rest::collection::Collection;
use crate::rest::errors::ResourceError;
use crate::rest::path::{PrefixTemplate, ResourcePath};
use crate::rest::query::{query_string, Params};
use crate::rest::record::Record;
use crate::rest::resource::ResourceType;

impl ResourceType {
    // -- Paths -------------------------------------------------------------

    /// Returns the prefix template built from [`ResourceType::prefix_source`].
    #[must_use]
    pub fn prefix_template(&self) -> PrefixTemplate {
        PrefixTemplate::new(&self.prefix_source())
    }

    /// Returns the placeholder names of the prefix template.
    #[must_use]
    pub fn prefix_parameters(&self) -> BTreeSet<String> {
        self.prefix_template().parameters()
    }

    /// Renders the prefix for the given options.
    #[must_use]
    pub fn prefix(&self, options: &Params) -> String {
        self.prefix_template().render(options)
    }

    /// Splits options into `(prefix options, query options)`.
    #[must_use]
    pub fn split_options(&self, options: &Params) -> (Params, Params) {
        let parameters = self.prefix_parameters();
        options
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .partition(|(key, _)| parameters.contains(key))
    }

    pub(crate) fn resource_path(&self, prefix_options: &Params) -> ResourcePath {
        ResourcePath::new(self.prefix(prefix_options), self.plural(), self.format())
    }

    /// Returns the path of one element, e.g. `posts/5/comments/1.json`.
    #[must_use]
    pub fn element_path(&self, id: impl Display, prefix_options: &Params, query: &Params) -> String {
        self.resource_path(prefix_options).element(id, query)
    }

    /// Returns the path of the collection, e.g. `posts/5/comments.json`.
    #[must_use]
    pub fn collection_path(&self, prefix_options: &Params, query: &Params) -> String {
        self.resource_path(prefix_options).collection(query)
    }

    /// Returns the path of a custom collection method, e.g.
    /// `people/retrieve.json`.
    #[must_use]
    pub fn custom_method_collection_path(&self, method: &str, options: &Params) -> String {
        let (prefix_options, query) = self.split_options(options);
        self.resource_path(&prefix_options)
            .custom_collection(method, &query)
    }

    // -- Requests ----------------------------------------------------------

    pub(crate) fn get_response(&self, path: &str) -> Result<HttpResponse, ResourceError> {
        Ok(self.connection()?.get(path, &self.headers())?)
    }

    pub(crate) fn get_decoded(&self, path: &str) -> Result<Value, ResourceError> {
        let response = self.get_response(path)?;
        Ok(self.format().decode(&response.body)?)
    }

    // -- Finders -----------------------------------------------------------

    /// Fetches one record by id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn find(&self, id: impl Display, options: &Params) -> Result<Record, ResourceError> {
        let (prefix_options, query) = self.split_options(options);
        let path = self.element_path(id, &prefix_options, &query);
        let attributes = self.get_decoded(&path)?;
        Ok(Record::from_value(self, attributes, prefix_options))
    }

    /// Fetches the collection.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn find_all(&self, options: &Params) -> Result<Collection, ResourceError> {
        self.find_every(None, options)
    }

    /// Fetches a collection from an explicit path.
    ///
    /// All options, prefix parameters included, go into the query string.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn find_from(&self, from: &str, options: &Params) -> Result<Collection, ResourceError> {
        self.find_every(Some(from), options)
    }

    /// Returns the first record of the collection, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn find_first(&self, from: Option<&str>, options: &Params) -> Result<Option<Record>, ResourceError> {
        Ok(self.find_every(from, options)?.into_iter().next())
    }

    /// Fetches a single record from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn find_one(&self, from: &str, options: &Params) -> Result<Record, ResourceError> {
        let path = format!("{from}{}", query_string(options));
        let attributes = self.get_decoded(&path)?;
        Ok(Record::from_value(self, attributes, Params::new()))
    }

    fn find_every(&self, from: Option<&str>, options: &Params) -> Result<Collection, ResourceError> {
        let (path, prefix_options) = match from {
            Some(from) => (format!("{from}{}", query_string(options)), Params::new()),
            None => {
                let (prefix_options, query) = self.split_options(options);
                (self.collection_path(&prefix_options, &query), prefix_options)
            }
        };
        let response = self.get_response(&path)?;
        let elements = self.format().decode(&response.body)?;
        Ok(self.build_collection(elements, &prefix_options, response.headers))
    }

    /// Checks for a record with a HEAD request.
    ///
    /// Any connection error, a 404 included, counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Config`] if no connection can be opened.
    pub fn exists(&self, id: impl Display, options: &Params) -> Result<bool, ResourceError> {
        let (prefix_options, query) = self.split_options(options);
        let path = self.element_path(id, &prefix_options, &query);
        let connection = self.connection()?;
        match connection.head(&path, &self.headers()) {
            Ok(_) => Ok(true),
            Err(err) => {
                tracing::debug!(path = %path, "treating failed HEAD as absent: {err}");
                Ok(false)
            }
        }
    }

    /// Builds a record from `attributes` and saves it.
    ///
    /// The record is returned whether or not the service accepted it; check
    /// [`Record::is_valid`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] for failures other than validation.
    pub fn create(&self, attributes: Value) -> Result<Record, ResourceError> {
        let mut record = Record::new(self, attributes);
        record.save()?;
        Ok(record)
    }

    /// Builds records from a decoded collection document.
    ///
    /// A list yields one record per element and a map yields a single
    /// record. Anything else yields an empty collection.
    #[must_use]
    pub fn build_collection(
        &self,
        elements: Value,
        prefix_options: &Params,
        headers: std::collections::HashMap<String, Vec<String>>,
    ) -> Collection {
        let records = match elements {
            Value::List(items) => items
                .into_iter()
                .map(|item| Record::from_value(self, item, prefix_options.clone()))
                .collect(),
            map @ Value::Map(_) => vec![Record::from_value(self, map, prefix_options.clone())],
            _ => Vec::new(),
        };
        Collection::new(records, headers)
    }

    // -- Custom collection methods -----------------------------------------

    /// GETs `<prefix>/<plural>/<method>.<ext>` and decodes the body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails or the body does not
    /// decode.
    pub fn custom_get(&self, method: &str, options: &Params) -> Result<Value, ResourceError> {
        self.get_decoded(&self.custom_method_collection_path(method, options))
    }

    /// POSTs `body` to a custom collection method.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn custom_post(&self, method: &str, body: &[u8], options: &Params) -> Result<HttpResponse, ResourceError> {
        let path = self.custom_method_collection_path(method, options);
        Ok(self.connection()?.post(&path, &self.headers(), body)?)
    }

    /// PUTs `body` to a custom collection method.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn custom_put(&self, method: &str, body: &[u8], options: &Params) -> Result<HttpResponse, ResourceError> {
        let path = self.custom_method_collection_path(method, options);
        Ok(self.connection()?.put(&path, &self.headers(), body)?)
    }

    /// Sends DELETE to a custom collection method.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn custom_delete(&self, method: &str, options: &Params) -> Result<HttpResponse, ResourceError> {
        let path = self.custom_method_collection_path(method, options);
        Ok(self.connection()?.delete(&path, &self.headers())?)
    }

    /// Sends HEAD to a custom collection method.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] if the request fails.
    pub fn custom_head(&self, method: &str, options: &Params) -> Result<HttpResponse, ResourceError> {
        let path = self.custom_method_collection_path(method, options);
        Ok(self.connection()?.head(&path, &self.headers())?)
    }
}

#[cfg(test)]
mod tests {
    use crate::formats::{Format, Value};
    use crate::rest::query::Params;
    use crate::Registry;

    fn params(pairs: &[(&str, Value)]) -> Params {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_element_path_without_prefix() {
        let registry = Registry::new();
        let person = registry
            .define("", "Person")
            .site("http://localhost:3000")
            .build()
            .unwrap();
        assert_eq!(
            person.element_path(5, &Params::new(), &Params::new()),
            "people/5.json"
        );
        assert_eq!(
            person.collection_path(&Params::new(), &params(&[("page", Value::from(2))])),
            "people.json?page=2"
        );
    }

    #[test]
    fn test_split_options_uses_prefix_parameters() {
        let registry = Registry::new();
        let person = registry
            .define("", "Person")
            .site("http://localhost/stores/$store_id/")
            .build()
            .unwrap();
        let (prefix, query) = person.split_options(&params(&[
            ("store_id", Value::from(1)),
            ("name", Value::from("Matz")),
        ]));
        assert_eq!(prefix.keys().collect::<Vec<_>>(), vec!["store_id"]);
        assert_eq!(query.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_split_is_computed_per_type() {
        let registry = Registry::new();
        let person = registry
            .define("", "Person")
            .site("http://localhost/stores/$store_id/")
            .build()
            .unwrap();
        let actor = person.subtype("Actor").prefix_source("/studios/$studio_id/").build().unwrap();
        let options = params(&[("store_id", Value::from(1)), ("studio_id", Value::from(2))]);

        assert_eq!(
            person.collection_path(&person.split_options(&options).0, &Params::new()),
            "stores/1/people.json"
        );
        assert_eq!(
            actor.collection_path(&actor.split_options(&options).0, &Params::new()),
            "studios/2/actors.json"
        );
    }

    #[test]
    fn test_custom_method_collection_path() {
        let registry = Registry::new();
        let person = registry
            .define("", "Person")
            .site("http://localhost/stores/$store_id/")
            .format(Format::Xml)
            .build()
            .unwrap();
        assert_eq!(
            person.custom_method_collection_path(
                "managers",
                &params(&[("store_id", Value::from(1)), ("active", Value::from(true))])
            ),
            "stores/1/people/managers.xml?active=true"
        );
    }

    #[test]
    fn test_build_collection_shapes() {
        let registry = Registry::new();
        let person = registry.define("", "Person").build().unwrap();
        let list = Value::List(vec![
            Value::from_pairs([("id", Value::from(1))]),
            Value::from_pairs([("id", Value::from(2))]),
        ]);
        let collection = person.build_collection(list, &Params::new(), Default::default());
        assert_eq!(collection.len(), 2);

        let single = person.build_collection(
            Value::from_pairs([("id", Value::from(1))]),
            &Params::new(),
            Default::default(),
        );
        assert_eq!(single.len(), 1);

        let nothing = person.build_collection(Value::from("x"), &Params::new(), Default::default());
        assert!(nothing.is_empty());
    }
}
