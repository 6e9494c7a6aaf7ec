//! Output writers for generated artifacts.
//!
//! Every write replaces the whole file. Regenerating over an existing file
//! requires a positive answer from an [`OverwriteGuard`]. A batch of
//! artifacts is staged beside its destinations and only moved into place
//! once every file has been staged.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::{Dir, OpenOptions};
use std::io::Write;

use crate::error::{CollectionError, Result};
use crate::fs_helpers::{self, ensure_dir};

/// One rendered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Destination path.
    pub path: Utf8PathBuf,
    /// Rendered text.
    pub text: String,
}

/// Decides whether an existing file may be replaced.
pub trait OverwriteGuard {
    /// Returns `true` to replace the file at `path`.
    fn confirm_overwrite(&mut self, path: &Utf8Path) -> bool;
}

impl<F> OverwriteGuard for F
where
    F: FnMut(&Utf8Path) -> bool,
{
    fn confirm_overwrite(&mut self, path: &Utf8Path) -> bool {
        self(path)
    }
}

/// Guard that always replaces existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl OverwriteGuard for AlwaysOverwrite {
    fn confirm_overwrite(&mut self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Guard that refuses to replace existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl OverwriteGuard for NeverOverwrite {
    fn confirm_overwrite(&mut self, _path: &Utf8Path) -> bool {
        false
    }
}

/// Fails with [`CollectionError::FileExists`] when `path` exists and the
/// guard declines to replace it.
///
/// # Errors
///
/// Returns [`CollectionError::FileExists`] on refusal,
/// [`CollectionError::NotAFile`] when something other than a file occupies
/// `path`, or an I/O error when the path cannot be probed.
pub fn check_overwrite(path: &Utf8Path, guard: &mut dyn OverwriteGuard) -> Result<()> {
    if fs_helpers::existing_file(path)? && !guard.confirm_overwrite(path) {
        tracing::warn!(%path, "overwrite declined");
        return Err(CollectionError::FileExists(path.to_path_buf()));
    }
    Ok(())
}

/// Writes `content` to `file_name` inside `dir`, creating `dir` if needed.
///
/// # Errors
///
/// Returns [`CollectionError::Io`] when the directory or file cannot be
/// created or written.
pub fn write_text(dir: &Utf8Path, file_name: &str, content: &str) -> Result<Utf8PathBuf> {
    let handle = ensure_dir(dir)?;
    let file_path = dir.join(file_name);
    let mut file = handle
        .open_with(
            file_name,
            OpenOptions::new().write(true).create(true).truncate(true),
        )
        .map_err(|io_err| CollectionError::io(&file_path, io_err))?;
    file.write_all(content.as_bytes())
        .map_err(|io_err| CollectionError::io(&file_path, io_err))?;
    Ok(file_path)
}

/// Writes a batch of artifacts, staging all of them before any destination
/// changes.
///
/// Each artifact is first written to a hidden sibling file. Only when every
/// artifact has been staged are the staged files renamed over their
/// destinations. A staging failure removes the staged files and leaves
/// every destination untouched.
///
/// # Errors
///
/// Returns [`CollectionError::Io`] when a directory, staging file or rename
/// fails.
pub fn write_artifacts(artifacts: &[GeneratedArtifact]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        match stage(artifact) {
            Ok(entry) => staged.push(entry),
            Err(err) => {
                discard(&staged);
                return Err(err);
            }
        }
    }
    for (position, entry) in staged.iter().enumerate() {
        if let Err(io_err) = entry
            .dir
            .rename(&entry.staging_name, &entry.dir, &entry.file_name)
        {
            discard(staged.get(position..).unwrap_or_default());
            return Err(CollectionError::io(&entry.path, io_err));
        }
        tracing::info!(path = %entry.path, bytes = entry.bytes, "wrote artifact");
    }
    Ok(())
}

struct Staged {
    dir: Dir,
    path: Utf8PathBuf,
    file_name: String,
    staging_name: String,
    bytes: usize,
}

fn stage(artifact: &GeneratedArtifact) -> Result<Staged> {
    let (parent, file_name) = fs_helpers::split_file_path(&artifact.path)?;
    let dir = ensure_dir(&parent)?;
    let staging_name = format!(".{file_name}.partial");
    let mut file = dir
        .open_with(
            &staging_name,
            OpenOptions::new().write(true).create(true).truncate(true),
        )
        .map_err(|io_err| CollectionError::io(parent.join(&staging_name), io_err))?;
    if let Err(io_err) = file.write_all(artifact.text.as_bytes()) {
        drop(file);
        remove_staged(&dir, &parent, &staging_name);
        return Err(CollectionError::io(&artifact.path, io_err));
    }
    Ok(Staged {
        dir,
        path: artifact.path.clone(),
        file_name: file_name.to_owned(),
        staging_name,
        bytes: artifact.text.len(),
    })
}

fn discard(staged: &[Staged]) {
    for entry in staged {
        let parent = entry.path.parent().unwrap_or_else(|| Utf8Path::new("."));
        remove_staged(&entry.dir, parent, &entry.staging_name);
    }
}

fn remove_staged(dir: &Dir, parent: &Utf8Path, staging_name: &str) {
    if let Err(err) = dir.remove_file(staging_name) {
        tracing::warn!(path = %parent.join(staging_name), %err, "could not remove staged file");
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests panic on setup failures")]
mod tests {
    //! Tests for artifact writing.

    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn out_dir() -> (TempDir, Utf8PathBuf) {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(tempdir.path().to_path_buf())
            .expect("tempdir path is UTF-8");
        (tempdir, root)
    }

    #[rstest]
    fn writes_replace_whole_file(out_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = out_dir;
        let path = root.join("nested/Panel.cs");
        let artifact = GeneratedArtifact {
            path: path.clone(),
            text: "first version, long".to_owned(),
        };
        write_artifacts(&[artifact]).expect("first write");
        write_artifacts(&[GeneratedArtifact {
            path: path.clone(),
            text: "second".to_owned(),
        }])
        .expect("second write");
        let text = fs_helpers::read_text(&path).expect("read back");
        assert_eq!(text, "second");
        assert!(!root.join("nested/.Panel.cs.partial").exists());
    }

    #[rstest]
    fn failed_batch_leaves_no_files(out_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = out_dir;
        std::fs::write(root.join("blocked"), "plain file").expect("write blocking file");
        let first = root.join("Panel.Components.cs");
        let artifacts = [
            GeneratedArtifact {
                path: first.clone(),
                text: "components".to_owned(),
            },
            GeneratedArtifact {
                path: root.join("blocked/Panel.cs"),
                text: "behaviour".to_owned(),
            },
        ];

        let err = write_artifacts(&artifacts).expect_err("second destination is unusable");
        assert!(matches!(err, CollectionError::Io { .. }));
        assert!(!first.exists());
        assert!(!root.join(".Panel.Components.cs.partial").exists());
    }

    #[rstest]
    fn directory_destination_is_not_overwritable(out_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = out_dir;
        let path = root.join("Panel.cs");
        std::fs::create_dir(&path).expect("create blocking dir");

        let err = check_overwrite(&path, &mut AlwaysOverwrite).expect_err("directory refused");
        assert!(matches!(err, CollectionError::NotAFile(ref p) if *p == path));
    }

    #[rstest]
    fn guard_decides_on_existing_files(out_dir: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = out_dir;
        let path = write_text(&root, "Panel.cs", "x").expect("seed file");

        check_overwrite(&root.join("Other.cs"), &mut NeverOverwrite).expect("absent file passes");
        check_overwrite(&path, &mut AlwaysOverwrite).expect("confirmed overwrite passes");
        let err = check_overwrite(&path, &mut NeverOverwrite).expect_err("refused overwrite");
        assert!(matches!(err, CollectionError::FileExists(ref p) if *p == path));

        let mut asked = Vec::new();
        let mut recorder = |candidate: &Utf8Path| {
            asked.push(candidate.to_path_buf());
            true
        };
        check_overwrite(&path, &mut recorder).expect("closure guard");
        assert_eq!(asked, [path]);
    }
}
