//! HTTP request types.
//!
//! This module provides the [`HttpRequest`] handed to
//! [`Connection::execute`](crate::clients::Connection::execute).

use std::collections::BTreeMap;
use std::fmt;

/// Request or response headers keyed by name.
pub type Headers = BTreeMap<String, String>;

/// HTTP methods used by resources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Retrieve a resource or collection.
    Get,
    /// Create a resource or invoke a custom collection action.
    Post,
    /// Update a resource.
    Put,
    /// Remove a resource.
    Delete,
    /// Check whether a resource exists.
    Head,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }

    /// Returns `true` for methods that carry a request body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
        }
    }
}

/// A request for a connection to perform.
///
/// `path` is relative to the connection's site unless it is an absolute
/// `http(s)://` URL.
///
/// # Example
///
/// ```rust
/// use active_resource::{HttpMethod, HttpRequest};
///
/// let request = HttpRequest::new(HttpMethod::Post, "people.json")
///     .header("Accept", "application/json")
///     .body(br#"{"person":{"name":"Matz"}}"#.to_vec());
///
/// assert_eq!(request.method, HttpMethod::Post);
/// assert_eq!(request.headers.get("Accept").map(String::as_str), Some("application/json"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The path, relative to the site.
    pub path: String,
    /// Headers sent in addition to the connection's own.
    pub headers: Headers,
    /// The encoded request body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Adds a single header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds every header from `headers`.
    #[must_use]
    pub fn headers(mut self, headers: &Headers) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the body as text, for logging and tests.
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }
}
