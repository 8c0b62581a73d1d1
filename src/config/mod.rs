//! Configuration for resource types.
//!
//! Every resource type carries a [`TypeSettings`] block. A setting is either
//! set on the type itself or inherited from the nearest ancestor that sets
//! it, with the registry's base type supplying the defaults:
//!
//! | Setting        | Default                   |
//! |----------------|---------------------------|
//! | site           | none                      |
//! | user, password | none                      |
//! | timeout        | none (wait indefinitely)  |
//! | format         | [`Format::Json`]          |
//! | headers        | empty                     |
//! | primary key    | `id`                      |
//! | prefix source  | the effective site's path |
//! | connector      | [`HttpConnector`]         |
//!
//! The connection-relevant part of the effective configuration is captured
//! in [`ConnectionSettings`]; a type reuses its cached connection for as
//! long as that snapshot does not change.

mod newtypes;

use std::sync::Arc;
use std::time::Duration;

use crate::clients::{Connection, Connector, Headers, HttpConnector};
use crate::formats::Format;

pub use newtypes::SiteUrl;

/// Everything needed to open a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// The site requests are sent to.
    pub site: SiteUrl,
    /// User name for Basic authentication.
    pub user: Option<String>,
    /// Password for Basic authentication.
    pub password: Option<String>,
    /// Request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Wire format for request bodies.
    pub format: Format,
}

impl ConnectionSettings {
    /// Creates settings without credentials or timeout.
    #[must_use]
    pub const fn new(site: SiteUrl, format: Format) -> Self {
        Self {
            site,
            user: None,
            password: None,
            timeout: None,
            format,
        }
    }
}

/// A setting that is either owned by a type or inherited from its parent.
#[derive(Clone, Debug)]
pub(crate) enum Setting<T> {
    Inherit,
    Own(T),
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Self::Inherit
    }
}

impl<T> Setting<T> {
    pub(crate) const fn own(&self) -> Option<&T> {
        match self {
            Self::Own(value) => Some(value),
            Self::Inherit => None,
        }
    }
}

/// Per-type configuration state.
///
/// Changing a connection-relevant setting makes the type the owner of its
/// own connection and drops any cached one.
#[derive(Debug, Default)]
pub(crate) struct TypeSettings {
    pub site: Setting<Option<SiteUrl>>,
    pub user: Setting<Option<String>>,
    pub password: Setting<Option<String>>,
    pub timeout: Setting<Option<Duration>>,
    pub format: Setting<Format>,
    pub headers: Setting<Headers>,
    pub primary_key: Setting<String>,
    pub prefix_source: Setting<String>,
    pub connector: Setting<Arc<dyn Connector>>,
    pub singular: String,
    pub plural: String,
    pub owns_connection: bool,
    pub connection: Option<(ConnectionSettings, Arc<dyn Connection>)>,
}

impl TypeSettings {
    /// The defaults carried by a registry's base type.
    pub(crate) fn base() -> Self {
        Self {
            site: Setting::Own(None),
            user: Setting::Own(None),
            password: Setting::Own(None),
            timeout: Setting::Own(None),
            format: Setting::Own(Format::default()),
            headers: Setting::Own(Headers::new()),
            primary_key: Setting::Own("id".to_string()),
            prefix_source: Setting::Inherit,
            connector: Setting::Own(Arc::new(HttpConnector)),
            singular: String::new(),
            plural: String::new(),
            owns_connection: true,
            connection: None,
        }
    }

    /// Sets the site, taking credentials embedded in the URL as the type's
    /// own user and password.
    pub(crate) fn set_site(&mut self, site: Option<SiteUrl>) {
        if let Some(site) = &site {
            if let Some(user) = site.user() {
                self.user = Setting::Own(Some(user.to_string()));
            }
            if let Some(password) = site.password() {
                self.password = Setting::Own(Some(password.to_string()));
            }
        }
        self.site = Setting::Own(site);
        self.invalidate();
    }

    pub(crate) fn set_user(&mut self, user: Option<String>) {
        self.user = Setting::Own(user);
        self.invalidate();
    }

    pub(crate) fn set_password(&mut self, password: Option<String>) {
        self.password = Setting::Own(password);
        self.invalidate();
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = Setting::Own(timeout);
        self.invalidate();
    }

    pub(crate) fn set_format(&mut self, format: Format) {
        self.format = Setting::Own(format);
        self.invalidate();
    }

    pub(crate) fn set_connector(&mut self, connector: Arc<dyn Connector>) {
        self.connector = Setting::Own(connector);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.owns_connection = true;
        self.connection = None;
    }
}
