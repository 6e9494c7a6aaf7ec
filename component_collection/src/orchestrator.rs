//! Drives collection and generation for one target.
//!
//! Operations either complete or fail before touching the target or the
//! filesystem. Per-item problems are returned as diagnostics.

use camino::{Utf8Path, Utf8PathBuf};

use crate::collector::{Collector, FieldEntry};
use crate::error::{
    Capability, ConfigurationError, Diagnostic, ResolutionError, Result, TemplateKind,
};
use crate::fs_helpers::check_dir_creatable;
use crate::generator::{
    BehaviourRequest, ComponentsRequest, ExtensionRequest, FieldTypeMap, Generator, Timestamp,
};
use crate::naming::is_valid_name;
use crate::output::{GeneratedArtifact, OverwriteGuard, check_overwrite, write_artifacts};
use crate::registry::{self, Registry};
use crate::scene::Scene;
use crate::settings::Settings;
use crate::target::{CollectionTarget, bound_fields};

/// File name of the type-wide extension artifact, without extension.
pub const EXTENSION_FILE_STEM: &str = "ComponentCollectionExtension";

/// How a scan result is merged into the stored entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectMode {
    /// Replace every stored entry.
    #[default]
    Update,
    /// Append, then drop later duplicates by field name.
    Add,
}

/// Which per-target artifacts to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArtifactSelection {
    /// `<Class>.Components.<ext>` only.
    #[default]
    Components,
    /// `<Class>.<ext>` only.
    Behaviour,
    /// Both files.
    All,
}

impl ArtifactSelection {
    const fn components(self) -> bool {
        matches!(self, Self::Components | Self::All)
    }

    const fn behaviour(self) -> bool {
        matches!(self, Self::Behaviour | Self::All)
    }
}

/// Artifacts written and problems skipped over by a generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Artifacts written, in write order.
    pub artifacts: Vec<GeneratedArtifact>,
    /// Fields skipped during rendering.
    pub diagnostics: Vec<Diagnostic>,
    /// Entries pruned before rendering.
    pub pruned: Vec<FieldEntry>,
}

/// Runs pipeline operations against a loaded settings snapshot.
#[derive(Debug)]
pub struct Orchestrator<'s> {
    settings: &'s Settings,
    collectors: Registry<dyn Collector>,
    generators: Registry<dyn Generator>,
}

impl<'s> Orchestrator<'s> {
    /// Creates an orchestrator with the built-in registries.
    #[must_use]
    pub fn new(settings: &'s Settings) -> Self {
        Self::with_registries(settings, registry::collectors(), registry::generators())
    }

    /// Creates an orchestrator with caller-supplied registries.
    #[must_use]
    pub const fn with_registries(
        settings: &'s Settings,
        collectors: Registry<dyn Collector>,
        generators: Registry<dyn Generator>,
    ) -> Self {
        Self {
            settings,
            collectors,
            generators,
        }
    }

    /// The settings snapshot.
    #[must_use]
    pub const fn settings(&self) -> &'s Settings {
        self.settings
    }

    /// Collector registry.
    #[must_use]
    pub const fn collectors(&self) -> &Registry<dyn Collector> {
        &self.collectors
    }

    /// Generator registry.
    #[must_use]
    pub const fn generators(&self) -> &Registry<dyn Generator> {
        &self.generators
    }

    /// Scans the scene under the target's root node and stores the result.
    ///
    /// Returns the scan diagnostics.
    ///
    /// # Errors
    ///
    /// Fails without changing `target` when the root node is missing or the
    /// collector cannot be resolved.
    pub fn collect(
        &mut self,
        target: &mut CollectionTarget,
        scene: &Scene,
        mode: CollectMode,
    ) -> Result<Vec<Diagnostic>> {
        let root = scene
            .find(&target.root)
            .ok_or_else(|| ResolutionError::MissingNode(target.root.clone()))?;
        self.collectors.select(target.collector.as_deref());
        let collector = self
            .collectors
            .active()?
            .ok_or(ConfigurationError::NoSelection(Capability::Collector))?;

        let result = collector.collect(scene, root, &target.naming(), self.settings.type_map());
        match mode {
            CollectMode::Update => target.fields = result.entries,
            CollectMode::Add => {
                target.fields.extend(result.entries);
                dedup_fields(&mut target.fields);
            }
        }
        tracing::info!(?mode, fields = target.fields.len(), "collected fields");
        Ok(result.diagnostics)
    }

    /// Renders and writes the per-target artifacts.
    ///
    /// Every check runs before the filesystem is touched, and the artifacts
    /// are written as one batch. Stale entries are left out of the
    /// Components artifact and pruned from `target` only after the batch
    /// has been written; a failed generation leaves `target` unchanged.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid names, paths or templates,
    /// a resolution error when no generator resolves,
    /// [`crate::error::CollectionError::FileExists`] when the guard refuses an overwrite,
    /// [`crate::error::CollectionError::NotAFile`] or
    /// [`crate::error::CollectionError::NotADirectory`] when a destination is
    /// occupied, and I/O errors from the writes.
    pub fn generate(
        &mut self,
        target: &mut CollectionTarget,
        scene: &Scene,
        selection: ArtifactSelection,
        created_at: &Timestamp,
        guard: &mut dyn OverwriteGuard,
    ) -> Result<GenerationReport> {
        self.generators.select(target.generator.as_deref());
        let generator = self
            .generators
            .active()?
            .ok_or(ConfigurationError::NoSelection(Capability::Generator))?;

        let dir = check_output(
            self.settings,
            &target.code_save_path,
            &target.namespace,
            Some(target.class_name.as_str()),
        )?;
        let templates = self.settings.templates();
        let components_template = if selection.components() {
            Some(templates.get(TemplateKind::Components)?)
        } else {
            None
        };
        let behaviour_template = if selection.behaviour() {
            Some(templates.get(TemplateKind::Behaviour)?)
        } else {
            None
        };

        let extension = &self.settings.values().file_extension;
        let components_path = dir.join(format!("{}.Components.{extension}", target.class_name));
        let behaviour_path = dir.join(format!("{}.{extension}", target.class_name));
        if components_template.is_some() {
            check_overwrite(&components_path, guard)?;
        }
        if behaviour_template.is_some() {
            check_overwrite(&behaviour_path, guard)?;
        }

        let prunes = components_template.is_some();
        let mut report = GenerationReport::default();
        if let Some(template) = components_template {
            let (bound, skipped) = bound_fields(target.live_fields(scene));
            for diagnostic in &skipped {
                tracing::warn!("{diagnostic}");
            }
            report.diagnostics = skipped;
            let fields: FieldTypeMap = bound
                .into_iter()
                .map(|entry| (entry.name.clone(), entry.component.type_name.clone()))
                .collect();
            let text = generator.render_components(&ComponentsRequest {
                template,
                namespace: &target.namespace,
                class_name: &target.class_name,
                fields: &fields,
                created_at,
            });
            report.artifacts.push(GeneratedArtifact {
                path: components_path,
                text,
            });
        }
        if let Some(template) = behaviour_template {
            let text = generator.render_behaviour(&BehaviourRequest {
                template,
                namespace: &target.namespace,
                class_name: &target.class_name,
                created_at,
            });
            report.artifacts.push(GeneratedArtifact {
                path: behaviour_path,
                text,
            });
        }

        write_artifacts(&report.artifacts)?;
        if prunes {
            report.pruned = target.prune_missing(scene);
        }
        Ok(report)
    }

    /// Renders and writes the type-wide extension artifact into the default
    /// save path under the default namespace.
    ///
    /// # Errors
    ///
    /// Fails like [`Self::generate`].
    pub fn generate_extension(
        &mut self,
        created_at: &Timestamp,
        guard: &mut dyn OverwriteGuard,
    ) -> Result<GenerationReport> {
        let values = self.settings.values();
        self.generators.select(Some(values.generator.as_str()));
        let generator = self
            .generators
            .active()?
            .ok_or(ConfigurationError::NoSelection(Capability::Generator))?;

        let dir = check_output(self.settings, &values.code_save_path, &values.namespace, None)?;
        let template = self.settings.templates().get(TemplateKind::Extension)?;
        let path = dir.join(format!("{EXTENSION_FILE_STEM}.{}", values.file_extension));
        check_overwrite(&path, guard)?;

        let type_names = self.settings.type_map().distinct_type_names();
        let text = generator.render_extension(&ExtensionRequest {
            template,
            namespace: &values.namespace,
            type_names: &type_names,
            created_at,
        });
        let artifacts = vec![GeneratedArtifact { path, text }];
        write_artifacts(&artifacts)?;
        Ok(GenerationReport {
            artifacts,
            ..GenerationReport::default()
        })
    }
}

fn check_output(
    settings: &Settings,
    save_path: &Utf8Path,
    namespace: &str,
    class_name: Option<&str>,
) -> Result<Utf8PathBuf> {
    if save_path.as_str().is_empty() {
        return Err(ConfigurationError::EmptySavePath.into());
    }
    if !is_valid_name(namespace) {
        return Err(ConfigurationError::InvalidNamespace(namespace.to_owned()).into());
    }
    if let Some(class_name) = class_name.filter(|name| !is_valid_name(name)) {
        return Err(ConfigurationError::InvalidClassName(class_name.to_owned()).into());
    }
    let dir = settings.resolve_path(save_path);
    check_dir_creatable(&dir)?;
    Ok(dir)
}

fn dedup_fields(fields: &mut Vec<FieldEntry>) {
    let mut seen = std::collections::HashSet::new();
    fields.retain(|entry| {
        let first = seen.insert(entry.name.clone());
        if !first {
            tracing::debug!(field = %entry.name, "dropped later duplicate field");
        }
        first
    });
}
