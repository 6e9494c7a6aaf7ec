//! Persisted state for one collection target.
//!
//! A target stores its field entries as a single ordered list. The entries
//! that bind to generated fields keep that order, so a field's accessor
//! index is its position among the bound entries.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::collector::FieldEntry;
use crate::error::{CollectionError, Diagnostic, Result};
use crate::fs_helpers;
use crate::naming::{FieldNameRule, NamingConfig, is_valid_field_name};
use crate::output::write_text;
use crate::runtime::ComponentCollection;
use crate::scene::{NodePath, Scene};
use crate::settings::Settings;

/// State of one inspected object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionTarget {
    /// Whether defaults have been copied from the settings.
    pub setup: bool,
    /// Selected collector key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collector: Option<String>,
    /// Field name prefix.
    pub field_name_prefix: String,
    /// Suffix fields with the type name instead of the type key.
    pub field_name_by_type: bool,
    /// Selected generator key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    /// Namespace for generated code.
    pub namespace: String,
    /// Class name for generated code.
    pub class_name: String,
    /// Output directory, relative to the project root.
    pub code_save_path: Utf8PathBuf,
    /// Path of the node scanned by `collect`.
    pub root: NodePath,
    /// Field entries in runtime index order.
    pub fields: Vec<FieldEntry>,
}

impl CollectionTarget {
    /// Reads a target from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be read and
    /// [`CollectionError::TomlParse`] when it is malformed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = fs_helpers::read_text(path)?;
        toml::from_str(&text).map_err(|source| CollectionError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a target, or returns an empty one when the file is absent.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_or_default(path: &Utf8Path) -> Result<Self> {
        if fs_helpers::file_exists(path)? {
            Self::load(path)
        } else {
            tracing::debug!(%path, "target file absent; starting empty");
            Ok(Self::default())
        }
    }

    /// Writes the target as TOML, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an error when serialisation or the write fails.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        let (dir, file_name) = fs_helpers::split_file_path(path)?;
        write_text(&dir, file_name, &text)?;
        Ok(())
    }

    /// Copies defaults from `settings` the first time the target is used.
    ///
    /// `class_name` is the fallback class name, normally the root node's
    /// name. Later calls do nothing.
    pub fn setup_defaults(&mut self, settings: &Settings, class_name: &str) {
        if self.setup {
            return;
        }
        let values = settings.values();
        self.setup = true;
        self.collector = Some(values.collector.clone()).filter(|key| !key.is_empty());
        self.field_name_prefix.clone_from(&values.field_name_prefix);
        self.field_name_by_type = values.field_name_by_type;
        self.generator = Some(values.generator.clone()).filter(|key| !key.is_empty());
        self.namespace.clone_from(&values.namespace);
        class_name.clone_into(&mut self.class_name);
        self.code_save_path.clone_from(&values.code_save_path);
        tracing::debug!(class = %self.class_name, "applied default target settings");
    }

    /// Naming inputs for a scan of this target.
    #[must_use]
    pub fn naming(&self) -> NamingConfig {
        NamingConfig::new(
            self.field_name_prefix.clone(),
            FieldNameRule::from_by_type(self.field_name_by_type),
        )
    }

    /// Entries whose component still resolves. The target is unchanged.
    #[must_use]
    pub fn live_fields(&self, scene: &Scene) -> Vec<&FieldEntry> {
        self.fields
            .iter()
            .filter(|entry| scene.is_live(&entry.component))
            .collect()
    }

    /// Drops entries whose component no longer resolves; returns them.
    pub fn prune_missing(&mut self, scene: &Scene) -> Vec<FieldEntry> {
        let (live, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.fields)
            .into_iter()
            .partition(|entry| scene.is_live(&entry.component));
        self.fields = live;
        for entry in &stale {
            tracing::info!(field = %entry.name, node = %entry.component.node, "removed stale field");
        }
        stale
    }

    /// Runtime component list, index-aligned with the generated accessors.
    #[must_use]
    pub fn runtime_collection(&self) -> ComponentCollection {
        let (bound, _) = bound_fields(&self.fields);
        ComponentCollection::new(
            bound
                .into_iter()
                .map(|entry| entry.component.clone())
                .collect(),
        )
    }
}

/// Entries that become generated fields, in accessor index order.
///
/// Entries with an invalid field name are skipped and reported. A repeated
/// name keeps its first entry.
pub fn bound_fields<'a, I>(fields: I) -> (Vec<&'a FieldEntry>, Vec<Diagnostic>)
where
    I: IntoIterator<Item = &'a FieldEntry>,
{
    let mut seen = HashSet::new();
    let mut bound = Vec::new();
    let mut skipped = Vec::new();
    for entry in fields {
        if !is_valid_field_name(&entry.name) {
            skipped.push(Diagnostic::InvalidFieldName(entry.name.clone()));
            continue;
        }
        if seen.insert(entry.name.as_str()) {
            bound.push(entry);
        } else {
            tracing::debug!(field = %entry.name, "skipped repeated field");
        }
    }
    (bound, skipped)
}
