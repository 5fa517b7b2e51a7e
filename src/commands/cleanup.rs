//! Startup sweep: remove backups left over from older editor versions.
//!
//! Runs before `apply` / `restore` unless `--no-cleanup` is given.  It never
//! prints anything and never fails the command; whatever happens is logged.

use std::path::PathBuf;

use crate::{fs_ops::FileOps, install::Installation};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

pub fn run(install: &Installation, ops: &FileOps<'_>) -> CleanupReport {
    let mut report = CleanupReport::default();

    let stale = match install.stale_backups() {
        Ok(stale) => stale,
        Err(err) => {
            tracing::warn!("skipping backup cleanup: {err}");
            return report;
        },
    };

    for path in stale {
        match ops.delete(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed stale backup");
                report.removed.push(path);
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), "could not remove stale backup: {err}");
                report.failed.push(path);
            },
        }
    }

    report
}
