//! The editor installation being patched.
//!
//! [`Installation`] is built once in `main` from the resolved config and then
//! handed by reference to every command handler.  It owns nothing but paths
//! and the editor version, so the layout rules live in one place:
//!
//! ```text
//! <root>/product.json                  the manifest
//! <root>/product.json.orig.<version>   pristine backup, one per editor version
//! <root>/package.json                  source of the editor version
//! <root>/<checksum_base>/…             files the manifest keys point at
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::error::{FixError, Result};

pub const MANIFEST_FILENAME: &str = "product.json";
pub const PACKAGE_FILENAME: &str = "package.json";

/// `product.json.orig.` — everything after it is the editor version.
fn backup_prefix() -> String {
    format!("{MANIFEST_FILENAME}.orig.")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    root: PathBuf,
    checksum_base: PathBuf,
    version: String,
}

impl Installation {
    /// `checksum_base` is interpreted relative to `root`.
    pub fn new(root: impl Into<PathBuf>, checksum_base: &str, version: impl Into<String>) -> Self {
        let root = root.into();
        let checksum_base = if checksum_base.is_empty() {
            root.clone()
        } else {
            root.join(checksum_base)
        };
        Self {
            root,
            checksum_base,
            version: version.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory the manifest's checksum keys are relative to.
    pub fn checksum_base(&self) -> &Path {
        &self.checksum_base
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILENAME)
    }

    /// Backup location for the current editor version.
    pub fn backup_path(&self) -> PathBuf {
        self.root.join(format!("{}{}", backup_prefix(), self.version))
    }

    pub fn has_backup(&self) -> bool {
        self.backup_path().exists()
    }

    /// Backups in the install root that belong to any other editor version.
    pub fn stale_backups(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.root).map_err(|e| FixError::read(&self.root, e))?;

        let mut stale = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FixError::read(&self.root, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            match backup_version(name) {
                Some(version) if version != self.version => stale.push(entry.path()),
                _ => {},
            }
        }
        stale.sort();
        Ok(stale)
    }
}

/// Version suffix of a backup file name, or `None` if `file_name` is not a
/// manifest backup.
pub fn backup_version(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(backup_prefix().as_str())
        .filter(|version| !version.is_empty())
}

/// Read the editor version from `<root>/package.json`.
pub fn detect_version(root: &Path) -> Result<String> {
    let path = root.join(PACKAGE_FILENAME);
    let text = fs::read_to_string(&path).map_err(|e| FixError::read(&path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| FixError::Parse {
        path: path.clone(),
        source,
    })?;

    value
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(FixError::VersionUnknown { path })
}

// ─── Install root discovery ───────────────────────────────────────────────────

/// Well-known `resources/app` locations for the host platform, most common
/// first.
pub fn candidate_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if cfg!(target_os = "macos") {
        roots.push("/Applications/Visual Studio Code.app/Contents/Resources/app".into());
        if let Some(home) = dirs::home_dir() {
            roots.push(home.join("Applications/Visual Studio Code.app/Contents/Resources/app"));
        }
    } else if cfg!(windows) {
        if let Some(local) = dirs::data_local_dir() {
            roots.push(local.join("Programs/Microsoft VS Code/resources/app"));
        }
        roots.push("C:/Program Files/Microsoft VS Code/resources/app".into());
    } else {
        roots.extend(
            [
                "/usr/share/code/resources/app",
                "/opt/visual-studio-code/resources/app",
                "/usr/lib/code/resources/app",
                "/snap/code/current/usr/share/code/resources/app",
            ]
            .map(PathBuf::from),
        );
    }

    roots
}

/// First candidate from `roots` that contains a manifest.
pub fn find_install_root(roots: &[PathBuf]) -> Option<PathBuf> {
    roots
        .iter()
        .find(|root| root.join(MANIFEST_FILENAME).is_file())
        .cloned()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
