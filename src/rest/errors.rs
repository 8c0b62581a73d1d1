//! Error types for resource operations.
//!
//! [`ResourceError`] is what finders and persistence methods return. It
//! wraps the lower layers unchanged, so callers can match on the exact
//! transport failure:
//!
//! ```rust,ignore
//! use active_resource::{ConnectionError, ResourceError};
//!
//! match person.find(1, &Params::new()) {
//!     Ok(record) => println!("Found: {record}"),
//!     Err(ResourceError::Connection(ConnectionError::ResourceNotFound(e))) => {
//!         println!("no such person at {}", e.url);
//!     }
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```
//!
//! Validation failures (422) on `save` are not errors: they fill the
//! record's [`ErrorSet`](crate::ErrorSet) and `save` returns `Ok(false)`.

use thiserror::Error;

use crate::clients::ConnectionError;
use crate::error::ConfigError;
use crate::formats::FormatError;

/// Failure of a class lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Neither an element name nor a class name was given.
    #[error("One of element_name or class_name must be specified.")]
    MissingName,
}

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The request failed or the service answered with an error status.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A response body could not be decoded, or a record could not be encoded.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The type is not configured well enough to talk to its service.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A class lookup was called without any name.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl ResourceError {
    /// Returns the HTTP status code behind the error, if any.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Connection(error) => error.code(),
            _ => None,
        }
    }

    /// Returns `true` if the service answered 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Connection(ConnectionError::ResourceNotFound(_))
        )
    }
}
