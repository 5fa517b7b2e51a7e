//! Shared fixtures for unit tests: a throwaway install root and fake
//! elevation backends.

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::{
    elevate::{Elevate, FileCommand},
    error::{FixError, Result},
    install::Installation,
};

// ─── Elevators ────────────────────────────────────────────────────────────────

/// What a [`RecordingElevator`] was asked to do.  Copies capture the staged
/// bytes since the temporary file is gone by the time the test looks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Copy { staged: Vec<u8>, to: PathBuf },
    Delete { path: PathBuf },
    Move { from: PathBuf, to: PathBuf },
}

/// Accepts every command without doing anything.
#[derive(Default)]
pub struct RecordingElevator {
    calls: RefCell<Vec<Recorded>>,
}

impl RecordingElevator {
    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.borrow().clone()
    }
}

impl Elevate for RecordingElevator {
    fn run(&self, cmd: &FileCommand<'_>) -> Result<()> {
        let recorded = match *cmd {
            FileCommand::Copy { from, to } => Recorded::Copy {
                staged: fs::read(from).expect("staged file should exist during the copy"),
                to: to.to_path_buf(),
            },
            FileCommand::Delete { path } => Recorded::Delete {
                path: path.to_path_buf(),
            },
            FileCommand::Move { from, to } => Recorded::Move {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            },
        };
        self.calls.borrow_mut().push(recorded);
        Ok(())
    }
}

/// Behaves like a user dismissing the prompt.
pub struct FailingElevator;

impl Elevate for FailingElevator {
    fn run(&self, cmd: &FileCommand<'_>) -> Result<()> {
        Err(FixError::ElevationFailed {
            label: cmd.label(),
            detail: "Request dismissed".into(),
        })
    }
}

/// `privilege.method = "none"`.
pub struct DisabledElevator;

impl Elevate for DisabledElevator {
    fn is_enabled(&self) -> bool {
        false
    }

    fn run(&self, cmd: &FileCommand<'_>) -> Result<()> {
        panic!("disabled elevator asked to run {cmd:?}");
    }
}

// ─── Install fixture ──────────────────────────────────────────────────────────

pub const VERSION: &str = "1.95.3";

/// A fake `resources/app` directory.  Checksum keys resolve against the root
/// itself (`checksum_base = ""`) so scenarios can use keys like `out/main.js`.
pub struct Fixture {
    _dir: TempDir,
    pub install: Installation,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_version(VERSION)
    }

    pub fn with_version(version: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let install = Installation::new(dir.path(), "", version);
        Self { _dir: dir, install }
    }

    /// The backup path for this fixture sits inside a directory that does not
    /// exist, so the plain move of the manifest onto it always fails.
    pub fn with_unreachable_backup() -> Self {
        Self::with_version(&format!("missing-dir/{VERSION}"))
    }

    pub fn root(&self) -> &Path {
        self.install.root()
    }

    /// Write an installed file (`rel` is slash-separated, like a manifest key).
    pub fn write_file(&self, rel: &str, contents: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn write_manifest(&self, json: &str) {
        fs::write(self.install.manifest_path(), json).unwrap();
    }

    pub fn manifest(&self) -> String {
        fs::read_to_string(self.install.manifest_path()).unwrap()
    }

    pub fn backup(&self) -> Option<String> {
        fs::read_to_string(self.install.backup_path()).ok()
    }

    /// File names of every backup in the install root, sorted.
    pub fn backups(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with("product.json.orig."))
            .collect();
        names.sort();
        names
    }
}
