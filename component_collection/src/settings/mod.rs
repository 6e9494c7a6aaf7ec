//! Project-wide settings: plugin defaults, naming defaults, templates and
//! the type-key table.
//!
//! Settings are layered with `figment`: built-in defaults, then the TOML
//! settings file, then `COMPONENT_COLLECTION_*` environment variables. The
//! derived [`TypeMap`] and the template texts are computed once at load
//! and kept alongside the values they came from.

mod discovery;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::{CollectionError, ConfigurationError, Result, TemplateKind};
use crate::fs_helpers;
use crate::registry::type_key;
use crate::type_map::{self, TypeKeyMapping, TypeMap};
use crate::{collector::DefaultCollector, generator::DefaultGenerator};

pub use discovery::{Session, find_settings_files, scaffold};

/// File name searched for under the project root.
pub const SETTINGS_FILE_NAME: &str = "component_collection.toml";
/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "COMPONENT_COLLECTION_";
/// Environment variable naming an explicit settings file.
pub const SETTINGS_PATH_ENV: &str = "COMPONENT_COLLECTION_SETTINGS";

/// Raw settings as written in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    /// Registry key of the default collector.
    pub collector: String,
    /// Registry key of the default generator.
    pub generator: String,
    /// Default field name prefix.
    pub field_name_prefix: String,
    /// Default naming rule: suffix with the type name instead of the key.
    pub field_name_by_type: bool,
    /// Default namespace for generated code.
    pub namespace: String,
    /// Default directory for generated code, relative to the project root.
    pub code_save_path: Utf8PathBuf,
    /// Extension given to generated files.
    pub file_extension: String,
    /// Template locations, relative to the settings file.
    pub templates: TemplatePaths,
    /// Ordered type-key table.
    pub component_maps: Vec<TypeKeyMapping>,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            collector: type_key::<DefaultCollector>().to_owned(),
            generator: type_key::<DefaultGenerator>().to_owned(),
            field_name_prefix: "m_".to_owned(),
            field_name_by_type: false,
            namespace: "Game".to_owned(),
            code_save_path: Utf8PathBuf::from("Assets"),
            file_extension: "cs".to_owned(),
            templates: TemplatePaths::default(),
            component_maps: type_map::default_mappings(),
        }
    }
}

impl SettingsFile {
    /// Defaults plus the template locations written by [`scaffold`].
    #[must_use]
    pub fn scaffold() -> Self {
        Self {
            templates: TemplatePaths {
                components: Some(Utf8PathBuf::from("templates/Components.txt")),
                behaviour: Some(Utf8PathBuf::from("templates/Behaviour.txt")),
                extension: Some(Utf8PathBuf::from("templates/Extension.txt")),
            },
            ..Self::default()
        }
    }
}

/// Template file locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePaths {
    /// Components template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Utf8PathBuf>,
    /// Behaviour template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behaviour: Option<Utf8PathBuf>,
    /// Extension template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Utf8PathBuf>,
}

/// Template texts, read once when the settings load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Templates {
    /// Components template text.
    pub components: Option<String>,
    /// Behaviour template text.
    pub behaviour: Option<String>,
    /// Extension template text.
    pub extension: Option<String>,
}

impl Templates {
    /// The built-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            components: Some(BUILTIN_COMPONENTS.to_owned()),
            behaviour: Some(BUILTIN_BEHAVIOUR.to_owned()),
            extension: Some(BUILTIN_EXTENSION.to_owned()),
        }
    }

    /// Returns the non-empty template text for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingTemplate`] when the template is
    /// not configured and [`ConfigurationError::EmptyTemplate`] when it has
    /// no content.
    pub fn get(&self, kind: TemplateKind) -> Result<&str, ConfigurationError> {
        let text = match kind {
            TemplateKind::Components => self.components.as_deref(),
            TemplateKind::Behaviour => self.behaviour.as_deref(),
            TemplateKind::Extension => self.extension.as_deref(),
        }
        .ok_or(ConfigurationError::MissingTemplate(kind))?;
        if text.is_empty() {
            return Err(ConfigurationError::EmptyTemplate(kind));
        }
        Ok(text)
    }
}

pub(crate) const BUILTIN_COMPONENTS: &str = include_str!("../../templates/Components.txt");
pub(crate) const BUILTIN_BEHAVIOUR: &str = include_str!("../../templates/Behaviour.txt");
pub(crate) const BUILTIN_EXTENSION: &str = include_str!("../../templates/Extension.txt");

/// Loaded, read-only settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    project_root: Utf8PathBuf,
    path: Option<Utf8PathBuf>,
    values: SettingsFile,
    templates: Templates,
    type_map: TypeMap,
}

impl Settings {
    /// Builds settings from values already in memory.
    #[must_use]
    pub fn new(project_root: impl Into<Utf8PathBuf>, values: SettingsFile, templates: Templates) -> Self {
        let type_map = TypeMap::from_mappings(&values.component_maps);
        Self {
            project_root: project_root.into(),
            path: None,
            values,
            templates,
            type_map,
        }
    }

    /// Loads the settings file at `path`, applying defaults and environment
    /// overrides, and reads the configured templates.
    ///
    /// # Errors
    ///
    /// Returns an error when the file or a template cannot be read, or when
    /// the merged values fail to deserialise.
    pub fn load(project_root: &Utf8Path, path: &Utf8Path) -> Result<Self> {
        let text = fs_helpers::read_text(path)?;
        toml::from_str::<toml::Value>(&text).map_err(|source| CollectionError::TomlParse {
            path: path.to_path_buf(),
            source,
        })?;
        let values: SettingsFile = Figment::from(Serialized::defaults(SettingsFile::default()))
            .merge(Toml::string(&text))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["SETTINGS"]))
            .extract()?;

        let base = path.parent().unwrap_or_else(|| Utf8Path::new("."));
        let templates = Templates {
            components: read_template(base, values.templates.components.as_deref())?,
            behaviour: read_template(base, values.templates.behaviour.as_deref())?,
            extension: read_template(base, values.templates.extension.as_deref())?,
        };

        tracing::info!(%path, mappings = values.component_maps.len(), "loaded settings");
        let mut settings = Self::new(project_root, values, templates);
        settings.path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Directory relative paths are resolved against.
    #[must_use]
    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    /// Location of the settings file, when loaded from disk.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// The merged setting values.
    #[must_use]
    pub const fn values(&self) -> &SettingsFile {
        &self.values
    }

    /// The deduplicated type-key table.
    #[must_use]
    pub const fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    /// The loaded templates.
    #[must_use]
    pub const fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Resolves `path` against the project root unless it is absolute.
    #[must_use]
    pub fn resolve_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

fn read_template(base: &Utf8Path, relative: Option<&Utf8Path>) -> Result<Option<String>> {
    relative
        .map(|path| fs_helpers::read_text(&base.join(path)))
        .transpose()
}

#[cfg(test)]
mod tests {
    //! Tests for settings values.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_convention() {
        let values = SettingsFile::default();
        assert_eq!(values.field_name_prefix, "m_");
        assert_eq!(values.namespace, "Game");
        assert_eq!(values.collector, "component_collection::collector::DefaultCollector");
        assert!(values.templates.components.is_none());
    }

    #[rstest]
    #[case(TemplateKind::Components)]
    #[case(TemplateKind::Behaviour)]
    #[case(TemplateKind::Extension)]
    fn missing_and_empty_templates_are_configuration_errors(#[case] kind: TemplateKind) {
        assert_eq!(
            Templates::default().get(kind),
            Err(ConfigurationError::MissingTemplate(kind))
        );
        let empty = Templates {
            components: Some(String::new()),
            behaviour: Some(String::new()),
            extension: Some(String::new()),
        };
        assert_eq!(empty.get(kind), Err(ConfigurationError::EmptyTemplate(kind)));
        assert!(Templates::builtin().get(kind).is_ok());
    }

    #[rstest]
    fn relative_paths_resolve_against_project_root() {
        let settings = Settings::new("/work/game", SettingsFile::default(), Templates::builtin());
        assert_eq!(
            settings.resolve_path(Utf8Path::new("Assets/UI")),
            Utf8PathBuf::from("/work/game/Assets/UI")
        );
        assert_eq!(
            settings.resolve_path(Utf8Path::new("/abs/out")),
            Utf8PathBuf::from("/abs/out")
        );
    }

    #[rstest]
    fn type_map_is_derived_once() {
        let values = SettingsFile {
            component_maps: vec![
                TypeKeyMapping::new("Text", "Text"),
                TypeKeyMapping::new("Text", "Label"),
            ],
            ..SettingsFile::default()
        };
        let settings = Settings::new(".", values, Templates::default());
        assert_eq!(settings.type_map().len(), 1);
        assert_eq!(settings.type_map().type_name("Text"), Some("Text"));
    }
}
