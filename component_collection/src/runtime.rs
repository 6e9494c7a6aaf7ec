//! Index-based component lookup for generated code.
//!
//! Generated accessors bind each field by its position in the collection.
//! Lookups never panic; failures are reported and yield `None`.

use crate::error::IndexError;
use crate::scene::{ComponentRef, Scene};

/// A component type that generated code can ask for by name.
pub trait ComponentKind {
    /// Type name as it appears in the scene and the type map.
    const TYPE_NAME: &'static str;
}

/// Ordered component handles, one per generated field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentCollection {
    components: Vec<ComponentRef>,
}

impl ComponentCollection {
    /// Wraps handles in field order.
    #[must_use]
    pub const fn new(components: Vec<ComponentRef>) -> Self {
        Self { components }
    }

    /// Number of handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Handles in field order.
    #[must_use]
    pub fn components(&self) -> &[ComponentRef] {
        &self.components
    }

    /// Looks up the handle at `index` and checks it against `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::OutOfRange`] past the end,
    /// [`IndexError::Dangling`] when the handle no longer resolves in
    /// `scene`, and [`IndexError::TypeMismatch`] when the component is not
    /// assignable to `type_name`.
    pub fn try_get_component(
        &self,
        scene: &Scene,
        index: usize,
        type_name: &str,
    ) -> Result<&ComponentRef, IndexError> {
        let handle = self.components.get(index).ok_or(IndexError::OutOfRange {
            index,
            len: self.components.len(),
        })?;
        if !scene.is_live(handle) {
            return Err(IndexError::Dangling { index });
        }
        if !scene.is_assignable(&handle.type_name, type_name) {
            return Err(IndexError::TypeMismatch {
                index,
                expected: type_name.to_owned(),
                actual: handle.type_name.clone(),
            });
        }
        Ok(handle)
    }

    /// Like [`Self::try_get_component`], logging the failure and returning
    /// `None` instead.
    #[must_use]
    pub fn get_component(&self, scene: &Scene, index: usize, type_name: &str) -> Option<&ComponentRef> {
        self.try_get_component(scene, index, type_name)
            .inspect_err(|err| tracing::error!("{err}"))
            .ok()
    }

    /// Typed form of [`Self::get_component`].
    #[must_use]
    pub fn get<T: ComponentKind>(&self, scene: &Scene, index: usize) -> Option<&ComponentRef> {
        self.get_component(scene, index, T::TYPE_NAME)
    }
}
