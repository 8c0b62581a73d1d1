//! Resource types.
//!
//! A [`ResourceType`] describes one kind of remote resource: where its
//! service lives, how it is named in paths and documents, and which format
//! it speaks. Types form a single-inheritance tree rooted at their
//! registry's base type; any setting a type does not set itself is taken
//! from its nearest ancestor that does.
//!
//! Handles are cheap to clone and compare by identity. Settings can be
//! changed at any time through a shared handle; changes are visible to all
//! subtypes that inherit them.
//!
//! # Example
//!
//! ```rust
//! use active_resource::{Format, Registry};
//!
//! let registry = Registry::new();
//! let person = registry
//!     .define("shop", "Person")
//!     .site("http://localhost:3000")
//!     .build()
//!     .unwrap();
//! let actor = person.subtype("Actor").build().unwrap();
//!
//! // Inherited until overridden
//! assert_eq!(actor.site().unwrap().origin(), "http://localhost:3000");
//! actor.set_format(Format::Xml);
//! assert_eq!(person.format(), Format::Json);
//! assert_eq!(actor.format(), Format::Xml);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use crate::clients::{Connection, Connector, Headers, HttpConnector};
use crate::config::{ConnectionSettings, Setting, SiteUrl, TypeSettings};
use crate::error::ConfigError;
use crate::formats::Format;
use crate::inflector::{camelize, pluralize, singularize, underscore};
use crate::rest::builder::ResourceTypeBuilder;
use crate::rest::errors::LookupError;
use crate::rest::registry::{qualify, Registry, RegistryInner};

/// Name of every registry's base type.
pub const BASE_TYPE_NAME: &str = "Resource";

struct TypeInner {
    name: String,
    module: String,
    parent: Option<ResourceType>,
    registry: Weak<RegistryInner>,
    settings: Mutex<TypeSettings>,
}

/// A handle to a resource type.
#[derive(Clone)]
pub struct ResourceType {
    inner: Arc<TypeInner>,
}

// Verify ResourceType is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceType>();
};

impl ResourceType {
    pub(crate) fn base(registry: Weak<RegistryInner>) -> Self {
        let mut settings = TypeSettings::base();
        settings.singular = underscore(BASE_TYPE_NAME);
        settings.plural = pluralize(&settings.singular);
        Self::from_parts(BASE_TYPE_NAME, "", None, registry, settings)
    }

    pub(crate) fn child(parent: &Self, module: &str, name: &str) -> Self {
        let mut settings = TypeSettings::default();
        settings.singular = underscore(name);
        settings.plural = pluralize(&settings.singular);
        Self::from_parts(
            name,
            module,
            Some(parent.clone()),
            parent.inner.registry.clone(),
            settings,
        )
    }

    fn from_parts(
        name: &str,
        module: &str,
        parent: Option<Self>,
        registry: Weak<RegistryInner>,
        settings: TypeSettings,
    ) -> Self {
        Self {
            inner: Arc::new(TypeInner {
                name: name.to_string(),
                module: module.to_string(),
                parent,
                registry,
                settings: Mutex::new(settings),
            }),
        }
    }

    fn settings(&self) -> MutexGuard<'_, TypeSettings> {
        self.inner
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Walks up the ancestry until a type owns the setting.
    fn inherited<T: Clone>(&self, pick: impl Fn(&TypeSettings) -> Option<&T>) -> Option<T> {
        let mut current = self.clone();
        loop {
            let found = pick(&current.settings()).cloned();
            if found.is_some() {
                return found;
            }
            let parent = current.inner.parent.clone()?;
            current = parent;
        }
    }

    /// Starts defining a subtype in the same module.
    pub fn subtype(&self, name: &str) -> ResourceTypeBuilder {
        ResourceTypeBuilder::new(self.registry(), &self.inner.module, name, self.clone())
    }

    /// Returns the type name, e.g. `Person`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the module path the type was defined in, e.g. `shop::admin`.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.inner.module
    }

    /// Returns `module::Name`, or just `Name` at the top level.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(&self.inner.module, &self.inner.name)
    }

    /// Returns the parent type; `None` only for a registry's base type.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.inner.parent.as_ref()
    }

    /// Returns `true` if `self` is `other` or one of its descendants.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(candidate) = current {
            if candidate == other {
                return true;
            }
            current = candidate.parent();
        }
        false
    }

    /// Returns the registry the type belongs to, if it is still alive.
    #[must_use]
    pub fn registry(&self) -> Option<Registry> {
        self.inner.registry.upgrade().map(Registry::from_inner)
    }

    // -- Effective settings ------------------------------------------------

    /// Returns the effective site.
    #[must_use]
    pub fn site(&self) -> Option<SiteUrl> {
        self.inherited(|s| s.site.own()).flatten()
    }

    /// Returns the effective user name.
    #[must_use]
    pub fn user(&self) -> Option<String> {
        self.inherited(|s| s.user.own()).flatten()
    }

    /// Returns the effective password.
    #[must_use]
    pub fn password(&self) -> Option<String> {
        self.inherited(|s| s.password.own()).flatten()
    }

    /// Returns the effective request timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.inherited(|s| s.timeout.own()).flatten()
    }

    /// Returns the effective wire format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.inherited(|s| s.format.own()).unwrap_or_default()
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub fn headers(&self) -> Headers {
        self.inherited(|s| s.headers.own()).unwrap_or_default()
    }

    /// Returns the name of the attribute holding the record id.
    #[must_use]
    pub fn primary_key(&self) -> String {
        self.inherited(|s| s.primary_key.own())
            .unwrap_or_else(|| "id".to_string())
    }

    /// Returns the prefix template source.
    ///
    /// Unless a type in the chain sets one explicitly, this is the path of
    /// the effective site.
    #[must_use]
    pub fn prefix_source(&self) -> String {
        self.inherited(|s| s.prefix_source.own()).unwrap_or_else(|| {
            self.site()
                .map(|site| site.path().to_string())
                .unwrap_or_default()
        })
    }

    /// Returns the element name used as document root, e.g. `person`.
    #[must_use]
    pub fn singular(&self) -> String {
        self.settings().singular.clone()
    }

    /// Returns the collection name used in paths, e.g. `people`.
    #[must_use]
    pub fn plural(&self) -> String {
        self.settings().plural.clone()
    }

    /// Returns the effective connector.
    #[must_use]
    pub fn connector(&self) -> Arc<dyn Connector> {
        self.inherited(|s| s.connector.own())
            .unwrap_or_else(|| Arc::new(HttpConnector))
    }

    // -- Setters -----------------------------------------------------------

    /// Sets or clears the site.
    ///
    /// Credentials embedded in the URL become this type's user and
    /// password.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSite`] if the URL does not parse.
    pub fn set_site(&self, site: Option<&str>) -> Result<(), ConfigError> {
        let site = site.map(SiteUrl::new).transpose()?;
        self.apply_site(site);
        Ok(())
    }

    pub(crate) fn apply_site(&self, site: Option<SiteUrl>) {
        tracing::debug!(resource = %self.name(), site = ?site, "setting site");
        self.settings().set_site(site);
    }

    /// Sets or clears the user name.
    pub fn set_user(&self, user: Option<&str>) {
        self.settings().set_user(user.map(str::to_string));
    }

    /// Sets or clears the password.
    pub fn set_password(&self, password: Option<&str>) {
        self.settings().set_password(password.map(str::to_string));
    }

    /// Sets or clears the request timeout.
    pub fn set_timeout(&self, timeout: Option<Duration>) {
        self.settings().set_timeout(timeout);
    }

    /// Sets the wire format.
    pub fn set_format(&self, format: Format) {
        self.settings().set_format(format);
    }

    /// Replaces the headers sent with every request.
    pub fn set_headers(&self, headers: Headers) {
        self.settings().headers = Setting::Own(headers);
    }

    /// Sets the primary key attribute name.
    pub fn set_primary_key(&self, primary_key: &str) {
        self.settings().primary_key = Setting::Own(primary_key.to_string());
    }

    /// Sets the prefix template source explicitly.
    pub fn set_prefix_source(&self, source: &str) {
        self.settings().prefix_source = Setting::Own(source.to_string());
    }

    /// Sets the element name.
    pub fn set_singular(&self, singular: &str) {
        self.settings().singular = singular.to_string();
    }

    /// Sets the collection name.
    pub fn set_plural(&self, plural: &str) {
        self.settings().plural = plural.to_string();
    }

    /// Replaces the connector used to open connections.
    pub fn set_connector(&self, connector: Arc<dyn Connector>) {
        self.settings().set_connector(connector);
    }

    // -- Connection --------------------------------------------------------

    /// Returns the effective connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSite`] if no type in the chain has a
    /// site.
    pub fn connection_settings(&self) -> Result<ConnectionSettings, ConfigError> {
        let site = self.site().ok_or_else(|| ConfigError::MissingSite {
            resource: self.name().to_string(),
        })?;
        Ok(ConnectionSettings {
            site,
            user: self.user(),
            password: self.password(),
            timeout: self.timeout(),
            format: self.format(),
        })
    }

    // The nearest type (self included) that owns a connection.
    fn connection_owner(&self) -> Self {
        let mut current = self.clone();
        loop {
            let owns = current.settings().owns_connection;
            match current.inner.parent.clone() {
                Some(parent) if !owns => current = parent,
                _ => return current,
            }
        }
    }

    /// Returns the connection for this type.
    ///
    /// Types that never changed a connection-relevant setting share their
    /// ancestor's connection. The connection is reused until the effective
    /// settings change.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if no site is configured or the connector
    /// fails.
    pub fn connection(&self) -> Result<Arc<dyn Connection>, ConfigError> {
        let owner = self.connection_owner();
        let settings = owner.connection_settings()?;
        let connector = owner.connector();

        if let Some((cached, connection)) = &owner.settings().connection {
            if *cached == settings {
                return Ok(Arc::clone(connection));
            }
        }

        // The connector may read the owner, so the lock is not held here.
        tracing::debug!(resource = %owner.name(), site = %settings.site, "opening connection");
        let connection = connector.connect(&settings)?;
        owner.settings().connection = Some((settings, Arc::clone(&connection)));
        Ok(connection)
    }

    // -- Class lookup ------------------------------------------------------

    /// Finds the type for a nested element.
    ///
    /// Names are derived from each other when only one is given: element
    /// `street_address` pairs with class `StreetAddress`. A custom resolver
    /// installed on the registry is asked first. Then, starting at this
    /// type's module and moving outwards, each enclosing module is searched
    /// for `module::ClassName` and `module::element_name::ClassName`.
    /// When nothing matches and `create_missing` is set, a subtype of this
    /// type is created in this type's module and registered.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::MissingName`] if both names are `None`.
    pub fn find_class_for(
        &self,
        element_name: Option<&str>,
        class_name: Option<&str>,
        create_missing: bool,
    ) -> Result<Option<Self>, LookupError> {
        let (element_name, class_name) = match (element_name, class_name) {
            (None, None) => return Err(LookupError::MissingName),
            (Some(element), Some(class)) => (element.to_string(), class.to_string()),
            (Some(element), None) => (element.to_string(), camelize(element)),
            (None, Some(class)) => (underscore(class), class.to_string()),
        };
        Ok(self.lookup_class(&element_name, &class_name, create_missing))
    }

    /// Finds (or creates) the type for the elements of a collection.
    #[must_use]
    pub fn find_class_for_collection(&self, collection_name: &str) -> Self {
        self.class_for_element(&singularize(collection_name))
    }

    pub(crate) fn class_for_element(&self, element_name: &str) -> Self {
        let class_name = camelize(element_name);
        self.lookup_class(element_name, &class_name, true)
            .unwrap_or_else(|| self.synthesize(&class_name))
    }

    fn lookup_class(&self, element_name: &str, class_name: &str, create_missing: bool) -> Option<Self> {
        if let Some(registry) = self.registry() {
            if let Some(found) = registry.resolve(element_name) {
                return Some(found);
            }
            let segments: Vec<&str> = self
                .inner
                .module
                .split("::")
                .filter(|segment| !segment.is_empty())
                .collect();
            for depth in (0..=segments.len()).rev() {
                let scope = segments[..depth].join("::");
                let candidates = [
                    qualify(&scope, class_name),
                    qualify(&qualify(&scope, element_name), class_name),
                ];
                if let Some(found) = candidates.iter().find_map(|name| registry.get(name)) {
                    return Some(found);
                }
            }
        }
        create_missing.then(|| self.synthesize(class_name))
    }

    fn synthesize(&self, class_name: &str) -> Self {
        tracing::debug!(
            parent = %self.qualified_name(),
            class = class_name,
            "creating resource type for nested element"
        );
        let created = Self::child(self, &self.inner.module, class_name);
        if let Some(registry) = self.registry() {
            return registry.register_if_absent(created);
        }
        created
    }
}

impl PartialEq for ResourceType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ResourceType {}

impl fmt::Debug for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceType")
            .field("name", &self.qualified_name())
            .field("parent", &self.parent().map(Self::qualified_name))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}
