//! Convention-driven component collection and code generation.
//!
//! Nodes in a scene hierarchy are named `Key_Key_Base`. Each type key is
//! resolved through a [`TypeMap`], the matching component is taken from the
//! node, and the resulting field entries are rendered into source files by
//! plain token substitution.
//!
//! The pipeline is:
//!
//! 1. [`settings::Session::open`] finds and loads the project's settings.
//! 2. [`Orchestrator::collect`] scans a [`Scene`] into a
//!    [`CollectionTarget`] with a pluggable [`Collector`].
//! 3. [`Orchestrator::generate`] validates the target and writes artifacts
//!    through a pluggable [`Generator`].
//!
//! At run time, [`ComponentCollection`] hands components back by index.

pub mod collector;
pub mod error;
pub mod fs_helpers;
pub mod generator;
pub mod naming;
pub mod orchestrator;
pub mod output;
pub mod registry;
pub mod runtime;
pub mod scene;
pub mod settings;
pub mod target;
pub mod type_map;

pub use collector::{CollectionResult, Collector, DefaultCollector, FieldEntry};
pub use error::{CollectionError, ConfigurationError, Diagnostic, IndexError, ResolutionError, Result};
pub use generator::{DefaultGenerator, Generator, Timestamp};
pub use orchestrator::{ArtifactSelection, CollectMode, GenerationReport, Orchestrator};
pub use registry::Registry;
pub use runtime::{ComponentCollection, ComponentKind};
pub use scene::{ComponentRef, NodePath, Scene};
pub use settings::{Session, Settings};
pub use target::CollectionTarget;
pub use type_map::TypeMap;
