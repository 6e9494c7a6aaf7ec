//! Locating the single settings file for a project.
//!
//! The project tree is walked for files named
//! [`SETTINGS_FILE_NAME`](super::SETTINGS_FILE_NAME). Exactly one must exist
//! for the project to be usable; none leaves the project unconfigured and
//! more than one is an error.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::Dir;

use super::{
    BUILTIN_BEHAVIOUR, BUILTIN_COMPONENTS, BUILTIN_EXTENSION, SETTINGS_FILE_NAME,
    SETTINGS_PATH_ENV, Settings, SettingsFile,
};
use crate::error::{CollectionError, ConfigurationError, Result};
use crate::fs_helpers;
use crate::output::write_text;

const SKIPPED_DIRS: [&str; 1] = ["target"];

/// Project configuration state.
#[derive(Debug, Clone)]
pub enum Session {
    /// No settings file exists yet.
    Unconfigured {
        /// Project root that was searched.
        project_root: Utf8PathBuf,
    },
    /// Exactly one settings file was found and loaded.
    Ready(Box<Settings>),
}

impl Session {
    /// Discovers and loads the project's settings.
    ///
    /// `COMPONENT_COLLECTION_SETTINGS` overrides discovery with an explicit
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SettingsAmbiguous`] when several
    /// settings files exist, or a loading error for the chosen file.
    pub fn open(project_root: &Utf8Path) -> Result<Self> {
        if let Some(explicit) = std::env::var(SETTINGS_PATH_ENV)
            .ok()
            .filter(|value| !value.is_empty())
        {
            tracing::debug!(path = %explicit, "using explicit settings path");
            let settings = Settings::load(project_root, Utf8Path::new(&explicit))?;
            return Ok(Self::Ready(Box::new(settings)));
        }

        let mut found = find_settings_files(project_root)?;
        match found.len() {
            0 => Ok(Self::Unconfigured {
                project_root: project_root.to_path_buf(),
            }),
            1 => {
                let path = found.remove(0);
                Ok(Self::Ready(Box::new(Settings::load(project_root, &path)?)))
            }
            _ => Err(ConfigurationError::SettingsAmbiguous(found).into()),
        }
    }

    /// Returns the settings, or [`ConfigurationError::SettingsMissing`].
    ///
    /// # Errors
    ///
    /// Fails when the project is unconfigured.
    pub fn into_settings(self) -> Result<Settings> {
        match self {
            Self::Ready(settings) => Ok(*settings),
            Self::Unconfigured { project_root } => {
                Err(ConfigurationError::SettingsMissing(project_root).into())
            }
        }
    }

    /// Moves an unconfigured project to ready by scaffolding a settings file.
    /// A ready session is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the files cannot be written.
    pub fn create_settings(self) -> Result<Settings> {
        match self {
            Self::Ready(settings) => Ok(*settings),
            Self::Unconfigured { project_root } => {
                let path = scaffold(&project_root)?;
                Settings::load(&project_root, &path)
            }
        }
    }
}

/// Every settings file under `project_root`, sorted by path.
///
/// Hidden directories and `target` are skipped.
///
/// # Errors
///
/// Returns [`CollectionError::Io`] when a directory cannot be read.
pub fn find_settings_files(project_root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let Some(dir) = fs_helpers::open_optional_dir(project_root)? else {
        return Ok(Vec::new());
    };
    let mut found = Vec::new();
    walk(&dir, project_root, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(dir: &Dir, base: &Utf8Path, found: &mut Vec<Utf8PathBuf>) -> Result<()> {
    let mut entries = Vec::new();
    for entry_result in dir.entries().map_err(|err| CollectionError::io(base, err))? {
        let entry = entry_result.map_err(|err| CollectionError::io(base, err))?;
        let name = entry
            .file_name()
            .map_err(|err| CollectionError::io(base, err))?;
        let file_type = entry
            .file_type()
            .map_err(|err| CollectionError::io(base.join(&name), err))?;
        entries.push((name, file_type));
    }
    entries.sort_by(|(left, _), (right, _)| left.cmp(right));

    for (name, file_type) in entries {
        let rel = base.join(&name);
        if file_type.is_dir() {
            if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
                continue;
            }
            let subdir = dir
                .open_dir(&name)
                .map_err(|err| CollectionError::io(&rel, err))?;
            walk(&subdir, &rel, found)?;
        } else if file_type.is_file() && name == SETTINGS_FILE_NAME {
            found.push(rel);
        }
    }
    Ok(())
}

/// Writes a settings file and the built-in templates under `project_root`.
///
/// Existing template files are left untouched.
///
/// # Errors
///
/// Returns an error when serialisation or a write fails.
pub fn scaffold(project_root: &Utf8Path) -> Result<Utf8PathBuf> {
    let values = SettingsFile::scaffold();
    let text = toml::to_string_pretty(&values)?;

    let templates = [
        (values.templates.components.as_deref(), BUILTIN_COMPONENTS),
        (values.templates.behaviour.as_deref(), BUILTIN_BEHAVIOUR),
        (values.templates.extension.as_deref(), BUILTIN_EXTENSION),
    ];
    for (configured, content) in templates {
        let Some(relative) = configured else {
            continue;
        };
        let path = project_root.join(relative);
        if fs_helpers::file_exists(&path)? {
            continue;
        }
        let (dir, file_name) = fs_helpers::split_file_path(&path)?;
        write_text(&dir, file_name, content)?;
    }

    let path = write_text(project_root, SETTINGS_FILE_NAME, &text)?;
    tracing::info!(%path, "created settings file");
    Ok(path)
}
