//! Configuration types and loading logic.
//!
//! Configuration is layered.  Each layer is parsed into a [`PartialConfig`]
//! (every field optional) and later layers win field by field:
//!
//! 1. `~/.config/fix-checksums/config.toml` — global defaults
//! 2. `--config` (default `./fix-checksums.toml`) — local overrides
//! 3. command-line flags (`--install-root`, `--editor-version`, …)
//!
//! [`PartialConfig::resolve`] then fills whatever is still unset from the
//! built-in defaults.  Both files may be absent; a bare `fix-checksums apply`
//! auto-detects the installation.
//!
//! # File format
//!
//! ```toml
//! [editor]
//! install_root  = "/usr/share/code/resources/app"  # optional, auto-detected
//! checksum_base = "out"                            # relative to install_root
//! version       = "1.95.3"                         # optional, from package.json
//!
//! [privilege]
//! method = "auto"   # auto | pkexec | sudo | doas | osascript | powershell | none
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{cli::Cli, elevate::ElevationMethod};

// ─── Resolved config ──────────────────────────────────────────────────────────

/// Fully resolved configuration, built once in `main`.
#[derive(Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Where the editor lives and how its manifest is laid out.
    #[serde(default)]
    pub editor: EditorConfig,

    /// What to do when a plain file operation is not permitted.
    #[serde(default)]
    pub privilege: PrivilegeConfig,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct EditorConfig {
    /// The editor's `resources/app` directory (the one holding
    /// `product.json`).  `None` means probe the well-known locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_root: Option<PathBuf>,

    /// Directory, relative to `install_root`, that the manifest's checksum
    /// keys are relative to.  The editor keys everything off `out/`.
    #[serde(default = "default_checksum_base")]
    pub checksum_base: String,

    /// Editor version used to tag the backup.  `None` means read it from
    /// `<install_root>/package.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            install_root: None,
            checksum_base: default_checksum_base(),
            version: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct PrivilegeConfig {
    #[serde(default)]
    pub method: ElevationMethod,
}

pub fn default_checksum_base() -> String {
    "out".into()
}

// ─── Partial config ───────────────────────────────────────────────────────────

/// One configuration layer.  Unset fields fall through to the layer below.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub editor: PartialEditor,
    #[serde(default)]
    pub privilege: PartialPrivilege,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialEditor {
    pub install_root: Option<PathBuf>,
    pub checksum_base: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialPrivilege {
    pub method: Option<ElevationMethod>,
}

impl PartialConfig {
    /// Layer `over` on top of `self`; fields set in `over` win.
    #[must_use]
    pub fn merge(self, over: Self) -> Self {
        Self {
            editor: PartialEditor {
                install_root: over.editor.install_root.or(self.editor.install_root),
                checksum_base: over.editor.checksum_base.or(self.editor.checksum_base),
                version: over.editor.version.or(self.editor.version),
            },
            privilege: PartialPrivilege {
                method: over.privilege.method.or(self.privilege.method),
            },
        }
    }

    /// Fill unset fields from the built-in defaults.
    pub fn resolve(self) -> Config {
        Config {
            editor: EditorConfig {
                install_root: self.editor.install_root,
                checksum_base: self
                    .editor
                    .checksum_base
                    .unwrap_or_else(default_checksum_base),
                version: self.editor.version,
            },
            privilege: PrivilegeConfig {
                method: self.privilege.method.unwrap_or_default(),
            },
        }
    }
}

impl From<&Cli> for PartialConfig {
    /// The command-line layer.
    fn from(cli: &Cli) -> Self {
        Self {
            editor: PartialEditor {
                install_root: cli.install_root.clone(),
                checksum_base: cli.checksum_base.clone(),
                version: cli.editor_version.clone(),
            },
            privilege: PartialPrivilege {
                method: cli.no_elevate.then_some(ElevationMethod::None),
            },
        }
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// `<config_dir>/fix-checksums/config.toml`, if the platform has a config dir.
pub fn global_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|d| d.join("fix-checksums").join("config.toml"))
}

/// Read one layer from `path`.
///
/// Returns `Ok(None)` if the file does not exist, and an error if it exists
/// but cannot be read or is not valid TOML.
pub fn parse_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text)
        .map(Some)
        .with_context(|| format!("parsing {}", path.display()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
