//! Connection error types.
//!
//! Every response that is not a plain success is mapped to a
//! [`ConnectionError`] variant by [`handle_response`]:
//!
//! | Status        | Variant                |
//! |---------------|------------------------|
//! | 301, 302      | `Redirection`          |
//! | other 2xx/3xx | success                |
//! | 400           | `BadRequest`           |
//! | 401           | `UnauthorizedAccess`   |
//! | 403           | `ForbiddenAccess`      |
//! | 404           | `ResourceNotFound`     |
//! | 405           | `MethodNotAllowed`     |
//! | 409           | `ResourceConflict`     |
//! | 422           | `ResourceInvalid`      |
//! | other 4xx     | `ClientError`          |
//! | 5xx           | `ServerError`          |
//! | anything else | `Unknown`              |
//!
//! Each variant carries an [`HttpResponseError`] with the full response so
//! callers can inspect the body (validation errors arrive with 422).
//!
//! # Example
//!
//! ```rust,ignore
//! use active_resource::ConnectionError;
//!
//! match connection.get("people/1.json", &headers) {
//!     Ok(response) => println!("{}", response.text()),
//!     Err(ConnectionError::ResourceNotFound(e)) => println!("missing: {}", e.url),
//!     Err(e) => println!("failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::http_response::HttpResponse;

/// A response whose status code signals failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("request to {url} failed with status {code}")]
pub struct HttpResponseError {
    /// The HTTP status code.
    pub code: u16,
    /// The path or URL that was requested.
    pub url: String,
    /// The complete response.
    pub response: HttpResponse,
}

/// Errors raised while talking to a service.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// 301 or 302.
    #[error("Redirection: {0}")]
    Redirection(HttpResponseError),

    /// 400.
    #[error("Bad request: {0}")]
    BadRequest(HttpResponseError),

    /// 401.
    #[error("Unauthorized access: {0}")]
    UnauthorizedAccess(HttpResponseError),

    /// 403.
    #[error("Forbidden access: {0}")]
    ForbiddenAccess(HttpResponseError),

    /// 404.
    #[error("Resource not found: {0}")]
    ResourceNotFound(HttpResponseError),

    /// 405.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(HttpResponseError),

    /// 409.
    #[error("Resource conflict: {0}")]
    ResourceConflict(HttpResponseError),

    /// 422, the body carries validation errors.
    #[error("Resource invalid: {0}")]
    ResourceInvalid(HttpResponseError),

    /// Any other 4xx.
    #[error("Client error: {0}")]
    ClientError(HttpResponseError),

    /// 5xx.
    #[error("Server error: {0}")]
    ServerError(HttpResponseError),

    /// A status outside the known ranges.
    #[error("Unknown response code: {0}")]
    Unknown(HttpResponseError),

    /// Network or protocol failure before a response arrived.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ConnectionError {
    /// Returns the failing response, if the error carries one.
    #[must_use]
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Redirection(e)
            | Self::BadRequest(e)
            | Self::UnauthorizedAccess(e)
            | Self::ForbiddenAccess(e)
            | Self::ResourceNotFound(e)
            | Self::MethodNotAllowed(e)
            | Self::ResourceConflict(e)
            | Self::ResourceInvalid(e)
            | Self::ClientError(e)
            | Self::ServerError(e)
            | Self::Unknown(e) => Some(&e.response),
            Self::Network(_) => None,
        }
    }

    /// Returns the HTTP status code, if the error carries a response.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        self.response().map(|response| response.code)
    }

    /// Returns `true` for 4xx responses.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.code().is_some_and(|code| (400..500).contains(&code))
    }
}

/// Maps a raw response onto success or the matching error variant.
///
/// # Errors
///
/// Returns the [`ConnectionError`] variant for the response's status code
/// (see the module table).
pub fn handle_response(url: &str, response: HttpResponse) -> Result<HttpResponse, ConnectionError> {
    let code = response.code;
    let variant: fn(HttpResponseError) -> ConnectionError = match code {
        301 | 302 => ConnectionError::Redirection,
        200..=399 => return Ok(response),
        400 => ConnectionError::BadRequest,
        401 => ConnectionError::UnauthorizedAccess,
        403 => ConnectionError::ForbiddenAccess,
        404 => ConnectionError::ResourceNotFound,
        405 => ConnectionError::MethodNotAllowed,
        409 => ConnectionError::ResourceConflict,
        422 => ConnectionError::ResourceInvalid,
        402..=499 => ConnectionError::ClientError,
        500..=599 => ConnectionError::ServerError,
        _ => ConnectionError::Unknown,
    };
    tracing::debug!(code, url, "request failed");
    Err(variant(HttpResponseError {
        code,
        url: url.to_string(),
        response,
    }))
}
