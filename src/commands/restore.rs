//! `fix-checksums restore` — put the pristine manifest back.
//!
//! Delete the patched `product.json`, then move
//! `product.json.orig.<version>` into its place.  This is a delete-then-move,
//! not an atomic swap: if the move fails the manifest stays deleted until the
//! next successful `restore`.  A manifest that is already missing (an `apply`
//! that died between its move and its write) counts as deleted, so `restore`
//! is also the repair path for that case.

use crate::{
    error::Result,
    fs_ops::FileOps,
    install::Installation,
    ui::{Change, Outcome},
};

/// Run `restore` and collapse any error into the generic failure outcome.
pub fn run(install: &Installation, ops: &FileOps<'_>) -> Outcome {
    Outcome::from_result(restore(install, ops))
}

pub fn restore(install: &Installation, ops: &FileOps<'_>) -> Result<Outcome> {
    let backup_path = install.backup_path();
    if !backup_path.exists() {
        tracing::info!(path = %backup_path.display(), "no backup for this version");
        return Ok(Outcome::Unchanged);
    }

    let manifest_path = install.manifest_path();
    ops.delete(&manifest_path)?;
    ops.rename(&backup_path, &manifest_path)?;

    Ok(Outcome::Changed(Change::Restored))
}
