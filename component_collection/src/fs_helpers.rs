//! Filesystem helpers shared across `component_collection` modules.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::CollectionError;

/// Opens a directory if it exists, returning `None` when the path is missing.
pub fn open_optional_dir(path: &Utf8Path) -> Result<Option<Dir>, CollectionError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(CollectionError::io(path, err)),
    }
}

/// Ensures a directory exists and returns a handle to it.
pub fn ensure_dir(path: &Utf8Path) -> Result<Dir, CollectionError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(dir),
        Err(open_err) if open_err.kind() == std::io::ErrorKind::NotFound => {
            Dir::create_ambient_dir_all(path, ambient_authority())
                .map_err(|io_err| CollectionError::io(path, io_err))?;
            Dir::open_ambient_dir(path, ambient_authority())
                .map_err(|io_err| CollectionError::io(path, io_err))
        }
        Err(open_err) => Err(CollectionError::io(path, open_err)),
    }
}

/// Splits a file path into its parent directory and file name.
pub fn split_file_path(path: &Utf8Path) -> Result<(Utf8PathBuf, &str), CollectionError> {
    let file_name = path.file_name().ok_or_else(|| {
        CollectionError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    };
    Ok((parent, file_name))
}

/// Reads a UTF-8 text file through a capability handle on its directory.
pub fn read_text(path: &Utf8Path) -> Result<String, CollectionError> {
    let (parent, file_name) = split_file_path(path)?;
    let dir = Dir::open_ambient_dir(&parent, ambient_authority())
        .map_err(|err| CollectionError::io(path, err))?;
    dir.read_to_string(file_name)
        .map_err(|err| CollectionError::io(path, err))
}

/// Returns whether a regular file exists at `path`.
pub fn file_exists(path: &Utf8Path) -> Result<bool, CollectionError> {
    let (parent, file_name) = split_file_path(path)?;
    let Some(dir) = open_optional_dir(&parent)? else {
        return Ok(false);
    };
    match dir.metadata(file_name) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(CollectionError::io(path, err)),
    }
}

/// Probes an artifact destination: `true` for a regular file, `false` when
/// nothing is there.
///
/// # Errors
///
/// Returns [`CollectionError::NotAFile`] when something other than a file
/// occupies `path`.
pub fn existing_file(path: &Utf8Path) -> Result<bool, CollectionError> {
    let (parent, file_name) = split_file_path(path)?;
    let Some(dir) = open_optional_dir(&parent)? else {
        return Ok(false);
    };
    match dir.metadata(file_name) {
        Ok(meta) if meta.is_file() => Ok(true),
        Ok(_) => Err(CollectionError::NotAFile(path.to_path_buf())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(CollectionError::io(path, err)),
    }
}

/// Checks that `path` is a directory or could be created as one. Nothing is
/// created.
///
/// # Errors
///
/// Returns [`CollectionError::NotADirectory`] when an existing component of
/// `path` is not a directory.
pub fn check_dir_creatable(path: &Utf8Path) -> Result<(), CollectionError> {
    let mut blocked: Option<&Utf8Path> = None;
    for ancestor in path.ancestors() {
        let probe = if ancestor.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            ancestor
        };
        match Dir::open_ambient_dir(probe, ambient_authority()) {
            Ok(_) => {
                return blocked.map_or(Ok(()), |file| {
                    Err(CollectionError::NotADirectory(file.to_path_buf()))
                });
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotADirectory => {
                blocked = Some(ancestor);
            }
            Err(err) => return Err(CollectionError::io(ancestor, err)),
        }
    }
    Ok(())
}
