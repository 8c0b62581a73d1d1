//! The connection capability.
//!
//! Resource types never talk HTTP directly. They ask their [`Connector`] for
//! a [`Connection`] built from the effective [`ConnectionSettings`] and send
//! everything through it, which makes the transport replaceable: tests plug
//! in an in-memory connector, applications can wrap the default one.

use std::fmt;
use std::sync::Arc;

use crate::clients::errors::{handle_response, ConnectionError};
use crate::clients::http_request::{Headers, HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ConnectionSettings;
use crate::error::ConfigError;

/// Something that can perform HTTP requests against a site.
///
/// Implementors provide [`Connection::execute`]; the verb helpers build the
/// request and pass the raw response through [`handle_response`], so
/// non-success status codes surface as [`ConnectionError`] variants.
pub trait Connection: Send + Sync + fmt::Debug {
    /// Performs a request and returns the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Network`] when no response was received.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ConnectionError>;

    /// Executes a request and maps its status code.
    ///
    /// # Errors
    ///
    /// Returns the [`ConnectionError`] matching a failing status code.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectionError> {
        let path = request.path.clone();
        let response = self.execute(request)?;
        handle_response(&path, response)
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    fn get(&self, path: &str, headers: &Headers) -> Result<HttpResponse, ConnectionError> {
        self.send(HttpRequest::new(HttpMethod::Get, path).headers(headers))
    }

    /// Sends a HEAD request.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    fn head(&self, path: &str, headers: &Headers) -> Result<HttpResponse, ConnectionError> {
        self.send(HttpRequest::new(HttpMethod::Head, path).headers(headers))
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    fn delete(&self, path: &str, headers: &Headers) -> Result<HttpResponse, ConnectionError> {
        self.send(HttpRequest::new(HttpMethod::Delete, path).headers(headers))
    }

    /// Sends a PUT request with a body.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    fn put(
        &self,
        path: &str,
        headers: &Headers,
        body: &[u8],
    ) -> Result<HttpResponse, ConnectionError> {
        self.send(
            HttpRequest::new(HttpMethod::Put, path)
                .headers(headers)
                .body(body.to_vec()),
        )
    }

    /// Sends a POST request with a body.
    ///
    /// # Errors
    ///
    /// See [`Connection::send`].
    fn post(
        &self,
        path: &str,
        headers: &Headers,
        body: &[u8],
    ) -> Result<HttpResponse, ConnectionError> {
        self.send(
            HttpRequest::new(HttpMethod::Post, path)
                .headers(headers)
                .body(body.to_vec()),
        )
    }
}

/// A factory for connections.
///
/// A resource type calls its connector whenever its effective connection
/// settings change; the result is cached until the next change.
pub trait Connector: Send + Sync + fmt::Debug {
    /// Opens a connection for the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the settings cannot be honoured.
    fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>, ConfigError>;
}
