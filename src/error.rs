//! Configuration error types.
//!
//! Everything that can go wrong while describing a resource type or opening
//! its connection is reported as a [`ConfigError`]. Transport and decoding
//! failures have their own types in [`crate::clients`] and [`crate::formats`].
//!
//! # Example
//!
//! ```rust
//! use active_resource::{ConfigError, SiteUrl};
//!
//! let result = SiteUrl::new("not a url");
//! assert!(matches!(result, Err(ConfigError::InvalidSite { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring resource types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No site is configured anywhere in the type's inheritance chain.
    #[error("No site configured for resource '{resource}'. Set a site on the type or one of its ancestors.")]
    MissingSite {
        /// The name of the type whose connection was requested.
        resource: String,
    },

    /// The site URL could not be parsed.
    #[error("Invalid site URL '{url}'. Expected an absolute URL such as 'http://api.example.com'.")]
    InvalidSite {
        /// The URL that was provided.
        url: String,
    },

    /// The underlying HTTP client could not be created.
    #[error("Failed to create HTTP client: {message}")]
    ClientBuild {
        /// The reason reported by the HTTP library.
        message: String,
    },
}
