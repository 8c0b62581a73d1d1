//! Resource types, records and their REST operations.
//!
//! This module provides:
//!
//! - **[`Registry`]**: the set of resource types, with class lookup for
//!   nested elements
//! - **[`ResourceType`]**: per-type configuration inherited along the type
//!   tree, prefix templates, finders and custom collection methods
//! - **[`Record`]**: dynamic attributes, identity, and the
//!   save/destroy/reload protocol
//! - **[`ErrorSet`]**: validation messages parsed from 422 responses
//! - **[`Collection`]**: finder results with their response headers
//! - **Path building**: [`PrefixTemplate`], [`ResourcePath`] and query
//!   encoding
//!
//! # Example
//!
//! ```rust,ignore
//! use active_resource::{Params, Registry, Value};
//!
//! let registry = Registry::new();
//! let person = registry
//!     .define("shop", "Person")
//!     .site("http://localhost:3000")
//!     .build()?;
//!
//! // GET people.json?name=Matz
//! let mut options = Params::new();
//! options.insert("name".to_string(), Value::from("Matz"));
//! let people = person.find_all(&options)?;
//!
//! // POST people.json
//! let david = person.create(Value::from_pairs([("name", Value::from("David"))]))?;
//! if !david.is_valid() {
//!     println!("{:?}", david.errors().full_messages());
//! }
//! ```

mod builder;
mod collection;
mod error_set;
mod errors;
mod finders;
mod path;
mod query;
mod record;
mod registry;
mod resource;

pub use builder::ResourceTypeBuilder;
pub use collection::Collection;
pub use error_set::{ErrorMessages, ErrorSet, BASE};
pub use errors::{LookupError, ResourceError};
pub use path::{PrefixTemplate, ResourcePath};
pub use query::{query_string, to_query, Params};
pub use record::{Attribute, Record};
pub use registry::{Registry, Resolver};
pub use resource::{ResourceType, BASE_TYPE_NAME};
