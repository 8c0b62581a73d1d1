//! # Active Resource
//!
//! A client-side object mapper for REST resources. Remote resources are
//! described by [`ResourceType`]s living in a [`Registry`]; records fetched
//! through a type behave like local objects with dynamic attributes, and
//! saving or destroying them turns into the matching HTTP call.
//!
//! ## Overview
//!
//! This crate provides:
//! - A structured [`Value`] model with JSON and XML codecs ([`formats`])
//! - Pluralization and case conversion helpers ([`inflector`])
//! - A [`Connection`] capability with a blocking HTTP implementation and
//!   status-code to error mapping ([`clients`])
//! - Resource types with inherited configuration, prefix templates and
//!   finders, plus records with persistence and validation errors ([`rest`])
//!
//! ## Quick Start
//!
//! ```rust
//! use active_resource::{Format, Registry};
//!
//! let registry = Registry::new();
//! let person = registry
//!     .define("shop", "Person")
//!     .site("http://localhost:3000")
//!     .format(Format::Json)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(person.plural(), "people");
//! assert_eq!(person.element_path(1, &Default::default(), &Default::default()), "people/1.json");
//! ```
//!
//! ## Nested Resources
//!
//! Resources nested below other resources declare a prefix template. Values
//! for the placeholders are taken from the options passed to the finders:
//!
//! ```rust,ignore
//! use active_resource::{Registry, Value};
//!
//! let comment = registry
//!     .define("blog", "Comment")
//!     .site("http://localhost/posts/$post_id/")
//!     .build()?;
//!
//! let mut options = active_resource::Params::new();
//! options.insert("post_id".to_string(), Value::from(5));
//! let comments = comment.find_all(&options)?;
//! // GET http://localhost/posts/5/comments.json
//! ```

pub mod clients;
pub mod config;
pub mod error;
pub mod formats;
pub mod inflector;
pub mod rest;

pub use clients::{
    Connection, ConnectionError, Connector, Headers, HttpConnection, HttpConnector, HttpMethod,
    HttpRequest, HttpResponse, HttpResponseError,
};
pub use config::{ConnectionSettings, SiteUrl};
pub use error::ConfigError;
pub use formats::{FileAttachment, Format, FormatError, Map, Value, XmlOptions};
pub use rest::{
    Attribute, Collection, ErrorMessages, ErrorSet, LookupError, Params, Record, Registry,
    Resolver, ResourceError, ResourceType, ResourceTypeBuilder,
};
