//! Privilege-aware write / delete / move.
//!
//! Each primitive first tries the ordinary filesystem call.  If that fails
//! (typically `EACCES` on a system-wide install) the same effect is retried
//! through [`Elevate`] with the equivalent OS command.  Writes cannot hand
//! their bytes to a command line directly, so they are staged in a temporary
//! file and privileged-copied over the destination.
//!
//! Unprivileged failures never escape this module; only a failed privileged
//! retry (or a disabled one) is returned to the caller.

use std::{fs, io, io::Write as _, path::Path};

use tempfile::NamedTempFile;

use crate::{
    elevate::{Elevate, FileCommand},
    error::{FixError, Result},
};

pub struct FileOps<'a> {
    elevator: &'a dyn Elevate,
}

impl<'a> FileOps<'a> {
    pub fn new(elevator: &'a dyn Elevate) -> Self {
        Self { elevator }
    }

    /// Replace the contents of `path` with `contents`.
    pub fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.resilient(
            "File Writer",
            path,
            || fs::write(path, contents),
            |elevator| {
                let staged = stage(contents, path).map_err(|source| FixError::Staging {
                    path: path.to_path_buf(),
                    source,
                })?;
                elevator.run(&FileCommand::Copy {
                    from: staged.path(),
                    to: path,
                })
            },
        )
    }

    /// Remove `path`.  A file that is already gone counts as deleted.
    pub fn delete(&self, path: &Path) -> Result<()> {
        self.resilient(
            "File Deleter",
            path,
            || match fs::remove_file(path) {
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
            |elevator| elevator.run(&FileCommand::Delete { path }),
        )
    }

    /// Move `from` to `to`, replacing `to` if it exists.
    pub fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.resilient(
            "File Renamer",
            from,
            || fs::rename(from, to),
            |elevator| elevator.run(&FileCommand::Move { from, to }),
        )
    }

    /// Run `plain`; on failure hand over to `privileged`.
    fn resilient<P, E>(&self, label: &'static str, path: &Path, plain: P, privileged: E) -> Result<()>
    where
        P: FnOnce() -> io::Result<()>,
        E: FnOnce(&dyn Elevate) -> Result<()>,
    {
        let err = match plain() {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        tracing::warn!(path = %path.display(), error = %err, "{label}: plain operation failed");
        if !self.elevator.is_enabled() {
            return Err(FixError::ElevationDisabled { label, source: err });
        }

        tracing::info!(path = %path.display(), "{label}: retrying with administrator privileges");
        privileged(self.elevator)
    }
}

/// Write `contents` to a fresh temporary file.  The file is removed when the
/// returned handle drops, i.e. after the privileged copy has finished.
///
/// Temporary files are created owner-only, and `cp` hands that mode on to a
/// destination it creates.  The staged file therefore takes the mode of the
/// file it replaces, or a world-readable default when there is none yet.
fn stage(contents: &[u8], dest: &Path) -> io::Result<NamedTempFile> {
    let mut staged = NamedTempFile::new()?;
    staged.write_all(contents)?;
    if let Some(permissions) = staged_permissions(dest) {
        staged.as_file().set_permissions(permissions)?;
    }
    staged.as_file().sync_all()?;
    Ok(staged)
}

#[cfg(unix)]
fn staged_permissions(dest: &Path) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(dest).map_or(0o644, |meta| meta.permissions().mode() & 0o777);
    Some(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn staged_permissions(dest: &Path) -> Option<fs::Permissions> {
    fs::metadata(dest).ok().map(|meta| meta.permissions())
}
