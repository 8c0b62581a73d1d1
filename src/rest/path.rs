//! Path building for REST resources.
//!
//! Every resource path is relative to the site and has the shape
//!
//! ```text
//! [prefix/]plural[/id][/method].extension[?query]
//! ```
//!
//! The prefix comes from a [`PrefixTemplate`], usually the path of the
//! type's site. Placeholders in the template are filled from the prefix
//! options of a call or record, so a comment type with the site
//! `http://blog/posts/$post_id/` reads comments of post 5 from
//! `posts/5/comments.json`.
//!
//! # Example
//!
//! ```rust
//! use active_resource::rest::{Params, PrefixTemplate, ResourcePath};
//! use active_resource::{Format, Value};
//!
//! let template = PrefixTemplate::new("/posts/$post_id/");
//! let mut options = Params::new();
//! options.insert("post_id".to_string(), Value::from(5));
//!
//! let path = ResourcePath::new(template.render(&options), "comments", Format::Json);
//! assert_eq!(path.element(1, &Params::new()), "posts/5/comments/1.json");
//! assert_eq!(path.collection(&Params::new()), "posts/5/comments.json");
//! ```

use std::collections::BTreeSet;
use std::fmt::Display;

use crate::formats::Format;
use crate::rest::query::{query_string, Params};

/// A prefix template with `$name` or `${name}` placeholders.
///
/// `$$` stands for a literal dollar sign. A `$` that does not start a valid
/// placeholder is kept as is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixTemplate {
    source: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

impl PrefixTemplate {
    /// Creates a template, dropping one trailing slash from the source.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            source: source.strip_suffix('/').unwrap_or(source).to_string(),
        }
    }

    /// Returns the template source (without its trailing slash).
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the names of all placeholders in the template.
    #[must_use]
    pub fn parameters(&self) -> BTreeSet<String> {
        self.pieces()
            .into_iter()
            .filter_map(|piece| match piece {
                Piece::Placeholder(name) => Some(name.to_string()),
                Piece::Literal(_) => None,
            })
            .collect()
    }

    /// Substitutes placeholders from `options` and strips leading slashes.
    ///
    /// Placeholders without a matching option render as empty text.
    #[must_use]
    pub fn render(&self, options: &Params) -> String {
        let mut rendered = String::with_capacity(self.source.len());
        for piece in self.pieces() {
            match piece {
                Piece::Literal(text) => rendered.push_str(text),
                Piece::Placeholder(name) => {
                    if let Some(value) = options.get(name) {
                        rendered.push_str(&value.to_string());
                    }
                }
            }
        }
        rendered.trim_start_matches('/').to_string()
    }

    fn pieces(&self) -> Vec<Piece<'_>> {
        let source = self.source.as_str();
        let mut pieces = Vec::new();
        let mut literal_start = 0;
        let mut index = 0;

        while let Some(offset) = source[index..].find('$') {
            let dollar = index + offset;
            let rest = &source[dollar + 1..];
            let (piece, consumed) = if rest.starts_with('$') {
                (Some(Piece::Literal("$")), 2)
            } else if let Some(braced) = rest.strip_prefix('{') {
                let name_len = identifier_len(braced);
                if name_len > 0 && braced[name_len..].starts_with('}') {
                    (Some(Piece::Placeholder(&braced[..name_len])), name_len + 3)
                } else {
                    (None, 1)
                }
            } else {
                let name_len = identifier_len(rest);
                if name_len > 0 {
                    (Some(Piece::Placeholder(&rest[..name_len])), name_len + 1)
                } else {
                    (None, 1)
                }
            };

            if let Some(piece) = piece {
                if literal_start < dollar {
                    pieces.push(Piece::Literal(&source[literal_start..dollar]));
                }
                pieces.push(piece);
                literal_start = dollar + consumed;
            }
            index = dollar + consumed;
        }
        if literal_start < source.len() {
            pieces.push(Piece::Literal(&source[literal_start..]));
        }
        pieces
    }
}

// Length of the leading `[_A-Za-z][_A-Za-z0-9]*` run.
fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(*c == '_' || c.is_ascii_alphanumeric()))
        .map_or(text.len(), |(i, _)| i)
}

/// Builds the paths of one resource collection below a rendered prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePath {
    prefix: String,
    plural: String,
    extension: &'static str,
}

impl ResourcePath {
    /// Creates a path builder.
    #[must_use]
    pub fn new(prefix: impl Into<String>, plural: impl Into<String>, format: Format) -> Self {
        Self {
            prefix: prefix.into(),
            plural: plural.into(),
            extension: format.extension(),
        }
    }

    /// `[prefix/]plural/id.ext[?query]`
    #[must_use]
    pub fn element(&self, id: impl Display, query: &Params) -> String {
        self.build(&format!("/{id}"), query)
    }

    /// `[prefix/]plural.ext[?query]`
    #[must_use]
    pub fn collection(&self, query: &Params) -> String {
        self.build("", query)
    }

    /// `[prefix/]plural/method.ext[?query]`
    #[must_use]
    pub fn custom_collection(&self, method: &str, query: &Params) -> String {
        self.build(&format!("/{method}"), query)
    }

    /// `[prefix/]plural/id/method.ext[?query]`
    #[must_use]
    pub fn custom_element(&self, id: impl Display, method: &str, query: &Params) -> String {
        self.build(&format!("/{id}/{method}"), query)
    }

    /// `[prefix/]plural/new/method.ext[?query]`
    #[must_use]
    pub fn custom_new_element(&self, method: &str, query: &Params) -> String {
        self.build(&format!("/new/{method}"), query)
    }

    fn build(&self, tail: &str, query: &Params) -> String {
        let mut path = String::new();
        if !self.prefix.is_empty() {
            path.push_str(&self.prefix);
            path.push('/');
        }
        path.push_str(&self.plural);
        path.push_str(tail);
        path.push('.');
        path.push_str(self.extension);
        path.push_str(&query_string(query));
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Value;

    fn options(pairs: &[(&str, Value)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_parameters_cover_both_placeholder_forms() {
        let template = PrefixTemplate::new("/objects/${object_id}/people/$person_id/");
        let names: Vec<String> = template.parameters().into_iter().collect();
        assert_eq!(names, vec!["object_id".to_string(), "person_id".to_string()]);
    }

    #[test]
    fn test_render_substitutes_and_strips_slashes() {
        let template = PrefixTemplate::new("/stores/$store_id/");
        assert_eq!(template.source(), "/stores/$store_id");
        assert_eq!(
            template.render(&options(&[("store_id", Value::from(1))])),
            "stores/1"
        );
    }

    #[test]
    fn test_render_missing_placeholder_is_empty() {
        let template = PrefixTemplate::new("/stores/$store_id/items");
        assert_eq!(template.render(&Params::new()), "stores//items");
    }

    #[test]
    fn test_render_ignores_unrelated_options() {
        let template = PrefixTemplate::new("/posts/${post_id}");
        let rendered = template.render(&options(&[
            ("post_id", Value::from(5)),
            ("page", Value::from(2)),
        ]));
        assert_eq!(rendered, "posts/5");
    }

    #[test]
    fn test_dollar_escapes_and_stray_dollars() {
        let template = PrefixTemplate::new("/price$$/$1/${}/$ok");
        assert_eq!(template.parameters().len(), 1);
        assert_eq!(
            template.render(&options(&[("ok", Value::from("x"))])),
            "price$/$1/${}/x"
        );
    }

    #[test]
    fn test_empty_template() {
        let template = PrefixTemplate::new("");
        assert!(template.parameters().is_empty());
        assert_eq!(template.render(&Params::new()), "");
        assert_eq!(PrefixTemplate::new("/").render(&Params::new()), "");
    }

    #[test]
    fn test_element_and_collection_paths() {
        let path = ResourcePath::new("", "people", Format::Json);
        assert_eq!(path.element(5, &Params::new()), "people/5.json");
        assert_eq!(path.collection(&Params::new()), "people.json");
        assert_eq!(
            path.collection(&options(&[("name", Value::from("Matz"))])),
            "people.json?name=Matz"
        );
    }

    #[test]
    fn test_custom_method_paths() {
        let path = ResourcePath::new("stores/1", "people", Format::Xml);
        assert_eq!(
            path.custom_collection("retrieve", &Params::new()),
            "stores/1/people/retrieve.xml"
        );
        assert_eq!(
            path.custom_element(7, "promote", &Params::new()),
            "stores/1/people/7/promote.xml"
        );
        assert_eq!(
            path.custom_new_element("register", &Params::new()),
            "stores/1/people/new/register.xml"
        );
    }
}
