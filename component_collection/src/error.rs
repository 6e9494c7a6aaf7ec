//! Error and diagnostic types for the component collection pipeline.
//!
//! Operation-level failures ([`CollectionError`]) abort before any side
//! effect. Per-item problems found while scanning or rendering are recorded
//! as [`Diagnostic`] values and never stop the surrounding operation.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::scene::NodePath;

/// Errors that block an entire operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectionError {
    /// Settings, naming or template problems.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A plugin or scene reference could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Failure while gathering settings from providers.
    #[error("failed to load settings: {0}")]
    Settings(#[from] figment::Error),

    /// A TOML document failed to parse.
    #[error("failed to parse TOML document '{path}': {source}")]
    TomlParse {
        /// Document location.
        path: Utf8PathBuf,
        /// Underlying parser error.
        #[source]
        source: toml::de::Error,
    },

    /// A document could not be serialised as TOML.
    #[error("failed to serialise TOML document: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// A JSON document failed to parse.
    #[error("failed to parse JSON document '{path}': {source}")]
    JsonParse {
        /// Document location.
        path: Utf8PathBuf,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// An artifact already exists and overwriting was not confirmed.
    #[error("file '{0}' already exists; confirm the overwrite to regenerate it")]
    FileExists(Utf8PathBuf),

    /// An artifact destination exists but is not a regular file.
    #[error("cannot write '{0}': the path exists and is not a file")]
    NotAFile(Utf8PathBuf),

    /// An output directory path runs through something other than a
    /// directory.
    #[error("cannot create directory '{0}': the path exists and is not a directory")]
    NotADirectory(Utf8PathBuf),

    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl CollectionError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = CollectionError> = std::result::Result<T, E>;

/// Problems with the settings asset or generation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// No settings file was found under the project root.
    #[error("no 'component_collection.toml' found under '{0}'; run `init` to create one")]
    SettingsMissing(Utf8PathBuf),

    /// More than one settings file was found.
    #[error("multiple settings files found, delete the redundant ones: {}", join_paths(.0))]
    SettingsAmbiguous(Vec<Utf8PathBuf>),

    /// The namespace does not match the identifier grammar.
    #[error("namespace '{0}' is invalid")]
    InvalidNamespace(String),

    /// The class name does not match the identifier grammar.
    #[error("class name '{0}' is invalid")]
    InvalidClassName(String),

    /// The code save path is empty.
    #[error("code save path is empty")]
    EmptySavePath,

    /// A template needed for rendering is not configured.
    #[error("{0} template is not configured in the settings file")]
    MissingTemplate(TemplateKind),

    /// A configured template has no content.
    #[error("{0} template is empty")]
    EmptyTemplate(TemplateKind),

    /// No plugin is selected for a capability.
    #[error("no {0} is selected")]
    NoSelection(Capability),
}

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(Utf8PathBuf::as_path)
        .map(Utf8Path::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which of the three templates an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Field declarations and accessors.
    Components,
    /// Behaviour scaffolding.
    Behaviour,
    /// Type-wide accessor extension.
    Extension,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Components => "components",
            Self::Behaviour => "behaviour",
            Self::Extension => "extension",
        })
    }
}

/// Pluggable capabilities held in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Scans a hierarchy into field entries.
    Collector,
    /// Renders templates into source text.
    Generator,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collector => "collector",
            Self::Generator => "generator",
        })
    }
}

/// Something named could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    /// No implementation is registered under the name.
    #[error("no {capability} registered as '{name}'")]
    UnknownPlugin {
        /// Capability being resolved.
        capability: Capability,
        /// Requested key.
        name: String,
    },

    /// A type key has no entry in the type map.
    #[error("component type key '{key}' on node '{node}' has no mapping component type")]
    UnresolvedTypeKey {
        /// Offending node name.
        node: String,
        /// Type key segment.
        key: String,
    },

    /// The node does not carry the resolved component type.
    #[error("node '{node}' has no component '{type_name}'")]
    MissingComponent {
        /// Offending node name.
        node: String,
        /// Resolved type name.
        type_name: String,
    },

    /// A node path does not resolve in the scene.
    #[error("node path '{0}' does not exist in the scene")]
    MissingNode(NodePath),
}

/// Two nodes produced the same field name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}' from node '{node}' already exists (owned by node '{owner}'); rename the node")]
pub struct CollisionError {
    /// Generated field name.
    pub field: String,
    /// Node whose entry was skipped.
    pub node: String,
    /// Node that owns the retained entry.
    pub owner: String,
}

/// Failures at the runtime accessor surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The index is past the end of the collection.
    #[error("get component failed with invalid index {index} (collection holds {len})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Collection length.
        len: usize,
    },

    /// The stored reference no longer resolves in the scene.
    #[error("get component failed, reference at index {index} is dangling")]
    Dangling {
        /// Requested index.
        index: usize,
    },

    /// The component is not assignable to the requested type.
    #[error("get component failed with invalid type, index = {index}: expected '{expected}', found '{actual}'")]
    TypeMismatch {
        /// Requested index.
        index: usize,
        /// Requested type name.
        expected: String,
        /// Stored component type name.
        actual: String,
    },
}

/// A non-fatal problem recorded against a single item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// Type key or component could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Duplicate field name.
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// Field name fails the field identifier grammar.
    #[error("field name '{0}' is invalid")]
    InvalidFieldName(String),
}
