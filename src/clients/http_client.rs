//! Blocking HTTP connection.
//!
//! This module provides [`HttpConnection`], the default [`Connection`]
//! implementation, and [`HttpConnector`], the default [`Connector`] that
//! builds one per effective configuration.

use std::collections::HashMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::clients::connection::{Connection, Connector};
use crate::clients::errors::ConnectionError;
use crate::clients::http_request::{Headers, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ConnectionSettings;
use crate::error::ConfigError;
use crate::formats::Format;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP connection to a single site.
///
/// The connection handles:
/// - URL construction from the site origin and relative resource paths
/// - HTTP Basic authentication when a user or password is configured
/// - `Content-Type` for request bodies, taken from the resource format
/// - An optional request timeout
///
/// # Thread Safety
///
/// `HttpConnection` is `Send + Sync` and can be shared between threads.
///
/// # Example
///
/// ```rust,ignore
/// use active_resource::{ConnectionSettings, Connection, HttpConnection, Format, SiteUrl};
///
/// let settings = ConnectionSettings::new(SiteUrl::new("http://localhost:3000")?, Format::Json);
/// let connection = HttpConnection::new(&settings)?;
/// let response = connection.get("people/1.json", &Default::default())?;
/// ```
#[derive(Debug)]
pub struct HttpConnection {
    /// The internal reqwest client.
    client: reqwest::blocking::Client,
    /// Scheme, host and port (e.g., `http://localhost:3000`).
    origin: String,
    /// Headers sent with every request.
    default_headers: Headers,
    /// Format used for the `Content-Type` of request bodies.
    format: Format,
}

// Verify HttpConnection is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpConnection>();
};

impl HttpConnection {
    /// Creates a connection for the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ClientBuild`] if the HTTP client cannot be
    /// created (for example when TLS initialization fails).
    pub fn new(settings: &ConnectionSettings) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| ConfigError::ClientBuild {
                message: err.to_string(),
            })?;

        let mut default_headers = Headers::new();
        default_headers.insert(
            "User-Agent".to_string(),
            format!("active-resource v{SDK_VERSION}"),
        );
        if settings.user.is_some() || settings.password.is_some() {
            let credentials = format!(
                "{}:{}",
                settings.user.as_deref().unwrap_or_default(),
                settings.password.as_deref().unwrap_or_default()
            );
            default_headers.insert(
                "Authorization".to_string(),
                format!("Basic {}", STANDARD.encode(credentials)),
            );
        }

        Ok(Self {
            client,
            origin: settings.site.origin().to_string(),
            default_headers,
            format: settings.format,
        })
    }

    /// Returns the site origin requests are sent to.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// Resolves a request path against the site origin.
    ///
    /// Absolute `http://` and `https://` URLs are used unchanged.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.origin, path.trim_start_matches('/'))
    }

    fn parse_response_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

impl Connection for HttpConnection {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ConnectionError> {
        let url = self.url_for(&request.path);
        tracing::info!("{} {}", request.method, url);

        let mut headers = self.default_headers.clone();
        headers.extend(request.headers);

        let mut builder = self.client.request(request.method.into(), &url);
        match request.body {
            Some(body) if !body.is_empty() => {
                tracing::debug!(bytes = body.len(), "sending request body");
                headers
                    .entry("Content-Type".to_string())
                    .or_insert_with(|| self.format.mime_type().to_string());
                builder = builder.body(body);
            }
            _ if request.method.has_body() => {
                headers
                    .entry("Content-Type".to_string())
                    .or_insert_with(|| self.format.mime_type().to_string());
                headers.insert("Content-Length".to_string(), "0".to_string());
            }
            _ => {}
        }
        tracing::debug!(headers = ?headers.keys().collect::<Vec<_>>(), "request headers");
        for (key, value) in &headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = Self::parse_response_headers(response.headers());
        let body = response.bytes()?.to_vec();
        tracing::info!(
            "--> {} {} ({} bytes)",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body.len()
        );

        Ok(HttpResponse {
            code: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_string(),
            body,
            headers,
        })
    }
}

/// The default [`Connector`], producing [`HttpConnection`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn Connection>, ConfigError> {
        tracing::debug!(site = %settings.site, "opening connection");
        Ok(Arc::new(HttpConnection::new(settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteUrl;

    fn settings(site: &str) -> ConnectionSettings {
        ConnectionSettings::new(SiteUrl::new(site).unwrap(), Format::Xml)
    }

    #[test]
    fn test_url_for_joins_origin_and_path() {
        let connection = HttpConnection::new(&settings("http://localhost:3000/api")).unwrap();
        assert_eq!(connection.origin(), "http://localhost:3000");
        assert_eq!(
            connection.url_for("people/1.xml"),
            "http://localhost:3000/people/1.xml"
        );
        assert_eq!(
            connection.url_for("/people.xml"),
            "http://localhost:3000/people.xml"
        );
        assert_eq!(
            connection.url_for("https://other.example/x.xml"),
            "https://other.example/x.xml"
        );
    }

    #[test]
    fn test_basic_auth_header_from_credentials() {
        let mut settings = settings("http://localhost");
        settings.user = Some("david".to_string());
        settings.password = Some("test123".to_string());
        let connection = HttpConnection::new(&settings).unwrap();
        assert_eq!(
            connection.default_headers().get("Authorization").map(String::as_str),
            Some("Basic ZGF2aWQ6dGVzdDEyMw==")
        );
    }

    #[test]
    fn test_no_auth_header_without_credentials() {
        let connection = HttpConnection::new(&settings("http://localhost")).unwrap();
        assert!(!connection.default_headers().contains_key("Authorization"));
    }
}
