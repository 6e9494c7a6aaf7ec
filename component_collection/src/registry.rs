//! Name-keyed registries of pluggable strategies.
//!
//! Implementations are registered explicitly under their fully-qualified
//! Rust type path. A registry tracks one selected name and lazily builds a
//! single active instance for it; changing the selection drops that
//! instance.

use std::collections::BTreeMap;
use std::fmt;

use crate::collector::{Collector, DefaultCollector};
use crate::error::{Capability, ResolutionError};
use crate::generator::{DefaultGenerator, Generator};

/// Display label for the empty selection.
pub const NONE_OPTION: &str = "<None>";

/// Constructor stored for each registered implementation.
pub type Factory<T> = Box<dyn Fn() -> Box<T>>;

/// Registry for one capability.
pub struct Registry<T: ?Sized> {
    capability: Capability,
    factories: BTreeMap<String, Factory<T>>,
    selected: Option<String>,
    active: Option<Box<T>>,
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("capability", &self.capability)
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .field("selected", &self.selected)
            .field("active", &self.active.is_some())
            .finish()
    }
}

impl<T: ?Sized> Registry<T> {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new(capability: Capability) -> Self {
        Self {
            capability,
            factories: BTreeMap::new(),
            selected: None,
            active: None,
        }
    }

    /// Registers `factory` under `name`, replacing any earlier factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<T> + 'static,
    {
        let key = name.into();
        if self.selected.as_deref() == Some(key.as_str()) {
            self.active = None;
        }
        self.factories.insert(key, Box::new(factory));
        self
    }

    /// Capability served by this registry.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        self.capability
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Selection options for a picker: [`NONE_OPTION`] followed by the names.
    #[must_use]
    pub fn options(&self) -> Vec<&str> {
        std::iter::once(NONE_OPTION).chain(self.names()).collect()
    }

    /// Returns whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Builds a fresh instance for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::UnknownPlugin`] when nothing is registered
    /// under `name`.
    pub fn resolve(&self, name: &str) -> Result<Box<T>, ResolutionError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ResolutionError::UnknownPlugin {
                capability: self.capability,
                name: name.to_owned(),
            })
    }

    /// Currently selected name.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Changes the selection; empty strings and [`NONE_OPTION`] clear it.
    ///
    /// The cached instance is dropped only when the selection changes.
    pub fn select(&mut self, name: Option<&str>) {
        let selection = name.filter(|value| !value.is_empty() && *value != NONE_OPTION);
        if self.selected.as_deref() == selection {
            return;
        }
        tracing::debug!(capability = %self.capability, ?selection, "selection changed");
        self.selected = selection.map(str::to_owned);
        self.active = None;
    }

    /// The active instance for the current selection, built on first use.
    ///
    /// Returns `Ok(None)` when nothing is selected.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::UnknownPlugin`] when the selected name is
    /// not registered; the selection is kept so the caller can report it.
    pub fn active(&mut self) -> Result<Option<&T>, ResolutionError> {
        let Some(name) = self.selected.as_deref() else {
            return Ok(None);
        };
        if self.active.is_none() {
            let instance = self.resolve(name)?;
            tracing::debug!(capability = %self.capability, name, "constructed active instance");
            self.active = Some(instance);
        }
        Ok(self.active.as_deref())
    }

    /// Returns whether an instance is currently cached.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.active.is_some()
    }
}

/// Registry key for an implementation type.
#[must_use]
pub fn type_key<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// Collector registry holding the built-in implementations.
#[must_use]
pub fn collectors() -> Registry<dyn Collector> {
    let mut registry: Registry<dyn Collector> = Registry::new(Capability::Collector);
    registry.register(type_key::<DefaultCollector>(), || Box::new(DefaultCollector));
    registry
}

/// Generator registry holding the built-in implementations.
#[must_use]
pub fn generators() -> Registry<dyn Generator> {
    let mut registry: Registry<dyn Generator> = Registry::new(Capability::Generator);
    registry.register(type_key::<DefaultGenerator>(), || Box::new(DefaultGenerator));
    registry
}
