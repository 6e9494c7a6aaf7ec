//! Lookup between short type keys and component type names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One configured `key -> type name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeKeyMapping {
    /// Short convention token used in node names.
    pub key: String,
    /// Component type the key stands for.
    pub type_name: String,
}

impl TypeKeyMapping {
    /// Creates a mapping.
    #[must_use]
    pub fn new(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            type_name: type_name.into(),
        }
    }
}

/// Deduplicated, order-preserving view over the configured mappings.
///
/// The first mapping declared for a key wins; later duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMap {
    by_key: IndexMap<String, String>,
}

impl TypeMap {
    /// Builds the map from mappings in declaration order.
    #[must_use]
    pub fn from_mappings(mappings: &[TypeKeyMapping]) -> Self {
        let mut by_key = IndexMap::with_capacity(mappings.len());
        for mapping in mappings {
            if by_key.contains_key(&mapping.key) {
                tracing::debug!(key = %mapping.key, "dropping duplicate type key mapping");
                continue;
            }
            by_key.insert(mapping.key.clone(), mapping.type_name.clone());
        }
        Self { by_key }
    }

    /// Type name mapped to `key`.
    #[must_use]
    pub fn type_name(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    /// Keys that map to `type_name`, in declaration order.
    #[must_use]
    pub fn keys_for(&self, type_name: &str) -> Vec<&str> {
        self.by_key
            .iter()
            .filter(|(_, name)| name.as_str() == type_name)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Distinct type names in order of first appearance.
    #[must_use]
    pub fn distinct_type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.by_key.values() {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Iterates the retained `(key, type name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_key
            .iter()
            .map(|(key, name)| (key.as_str(), name.as_str()))
    }

    /// Number of retained keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Returns whether no keys are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// The built-in UI component mappings.
#[must_use]
pub fn default_mappings() -> Vec<TypeKeyMapping> {
    [
        ("Tran", "Transform"),
        ("Rect", "RectTransform"),
        ("Anim", "Animation"),
        ("Animator", "Animator"),
        ("Text", "Text"),
        ("Image", "Image"),
        ("RawImage", "RawImage"),
        ("Button", "Button"),
        ("Toggle", "Toggle"),
        ("TGroup", "ToggleGroup"),
        ("Slider", "Slider"),
        ("Scrollbar", "Scrollbar"),
        ("Dropdown", "Dropdown"),
        ("InputField", "InputField"),
        ("Canvas", "Canvas"),
        ("ScrollView", "ScrollRect"),
        ("CGroup", "CanvasGroup"),
        ("GLGroup", "GridLayoutGroup"),
        ("VLGroup", "VerticalLayoutGroup"),
        ("HLGroup", "HorizontalLayoutGroup"),
        ("Mask", "Mask"),
        ("RectMask", "RectMask2D"),
    ]
    .into_iter()
    .map(|(key, type_name)| TypeKeyMapping::new(key, type_name))
    .collect()
}
