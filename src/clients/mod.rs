//! HTTP connection types.
//!
//! This module provides the transport layer resource types send their
//! requests through.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Connection`]: The capability resource types depend on
//! - [`Connector`]: Builds connections from [`ConnectionSettings`](crate::ConnectionSettings)
//! - [`HttpConnection`] / [`HttpConnector`]: The default blocking implementation
//! - [`HttpRequest`]: A request to perform
//! - [`HttpResponse`]: A raw response
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE, HEAD)
//! - [`ConnectionError`]: Status-code and network failures
//!
//! # Example
//!
//! ```rust,ignore
//! use active_resource::clients::{Connection, HttpConnection};
//! use active_resource::{ConnectionSettings, Format, SiteUrl};
//!
//! let settings = ConnectionSettings::new(SiteUrl::new("http://localhost:3000")?, Format::Json);
//! let connection = HttpConnection::new(&settings)?;
//!
//! let response = connection.get("people/1.json", &Default::default())?;
//! println!("{}", response.text());
//! ```

mod connection;
mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use connection::{Connection, Connector};
pub use errors::{handle_response, ConnectionError, HttpResponseError};
pub use http_client::{HttpConnection, HttpConnector, SDK_VERSION};
pub use http_request::{Headers, HttpMethod, HttpRequest};
pub use http_response::HttpResponse;
pub(crate) use http_response::first_header;
