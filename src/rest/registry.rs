//! The registry of resource types.
//!
//! A [`Registry`] owns a base type and every type defined through it,
//! indexed by qualified name (`module::Name`). Class lookup for nested
//! elements searches the registry, and types created during lookup are
//! added to it so the same element always maps to the same type.
//!
//! Registries are independent of each other: a test can build its own
//! registry without touching types used elsewhere.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::rest::builder::ResourceTypeBuilder;
use crate::rest::resource::ResourceType;

/// Hook consulted before the built-in class lookup.
///
/// Receives the element name and returns the type to use for it.
pub type Resolver = Arc<dyn Fn(&str) -> Option<ResourceType> + Send + Sync>;

pub(crate) struct RegistryInner {
    base: ResourceType,
    types: Mutex<BTreeMap<String, ResourceType>>,
    resolver: RwLock<Option<Resolver>>,
}

/// A set of resource types sharing one base type.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

// Verify Registry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Registry>();
};

impl Registry {
    /// Creates an empty registry with a fresh base type.
    #[must_use]
    pub fn new() -> Self {
        let inner = Arc::new_cyclic(|weak| RegistryInner {
            base: ResourceType::base(weak.clone()),
            types: Mutex::new(BTreeMap::new()),
            resolver: RwLock::new(None),
        });
        Self { inner }
    }

    pub(crate) const fn from_inner(inner: Arc<RegistryInner>) -> Self {
        Self { inner }
    }

    /// Returns the base type every other type descends from.
    ///
    /// Settings made on the base type apply to every type that does not
    /// override them.
    #[must_use]
    pub fn base(&self) -> ResourceType {
        self.inner.base.clone()
    }

    /// Starts defining a type named `name` in `module`.
    ///
    /// The new type derives from the base type unless
    /// [`ResourceTypeBuilder::parent`] says otherwise.
    pub fn define(&self, module: &str, name: &str) -> ResourceTypeBuilder {
        ResourceTypeBuilder::new(Some(self.clone()), module, name, self.base())
    }

    /// Returns the type registered under a qualified name.
    #[must_use]
    pub fn get(&self, qualified_name: &str) -> Option<ResourceType> {
        self.types().get(qualified_name).cloned()
    }

    /// Returns every registered type, ordered by qualified name.
    #[must_use]
    pub fn types(&self) -> BTreeMap<String, ResourceType> {
        self.inner
            .types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Installs a hook that is asked first whenever a nested element needs
    /// a type.
    pub fn set_resolver<F>(&self, resolver: F)
    where
        F: Fn(&str) -> Option<ResourceType> + Send + Sync + 'static,
    {
        *self
            .inner
            .resolver
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(resolver));
    }

    /// Removes the lookup hook.
    pub fn clear_resolver(&self) {
        *self
            .inner
            .resolver
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn resolve(&self, element_name: &str) -> Option<ResourceType> {
        // Clone the hook out so it may use the registry itself.
        let resolver = self
            .inner
            .resolver
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;
        resolver(element_name)
    }

    /// Registers a type, replacing any type of the same qualified name.
    pub(crate) fn register(&self, resource: &ResourceType) {
        self.inner
            .types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.qualified_name(), resource.clone());
    }

    /// Registers a type unless one of the same qualified name exists, and
    /// returns whichever is registered afterwards.
    pub(crate) fn register_if_absent(&self, resource: ResourceType) -> ResourceType {
        self.inner
            .types
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(resource.qualified_name())
            .or_insert(resource)
            .clone()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Joins a module path and a name with `::`.
pub(crate) fn qualify(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{module}::{name}")
    }
}
