//! `product.json` — the editor's integrity manifest.
//!
//! Only the `checksums` member matters to us, but the file carries plenty of
//! other product metadata which has to survive a rewrite untouched.  The
//! document is therefore kept as a raw JSON object (member order preserved
//! via serde_json's `preserve_order`) rather than a typed struct.
//!
//! ```json
//! {
//! 	"nameShort": "Code",
//! 	"checksums": {
//! 		"vs/workbench/workbench.desktop.main.js": "fJ1uzs0Z3cO1IH2Ay6Y2qpRuRbqFDaLx7aKNP0vSv4o",
//! 		"vs/code/electron-sandbox/workbench/workbench.html": "..."
//! 	}
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};

use crate::{
    checksum::compute_checksum,
    error::{FixError, Result},
};

const CHECKSUMS_KEY: &str = "checksums";

/// A recorded checksum that no longer matches the installed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    /// Slash-separated key as it appears in the manifest.
    pub file: String,
    /// What the manifest currently says (`None` if the value is not a string).
    pub recorded: Option<String>,
    /// What the file on disk actually hashes to.
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    document: Map<String, Value>,
}

impl Manifest {
    /// Read and parse the manifest at `path`.  Always hits the disk; the file
    /// may have been changed behind our back since the last run.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| FixError::read(path, e))?;
        Self::parse(path, &text)
    }

    /// Parse manifest text.  `path` is only used for error messages.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|source| FixError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(document) => Ok(Self { document }),
            _ => Err(FixError::NotAnObject {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The `checksums` table, if the manifest has one.
    pub fn checksums(&self) -> Option<&Map<String, Value>> {
        self.document.get(CHECKSUMS_KEY).and_then(Value::as_object)
    }

    /// Number of recorded checksums (0 when there is no table).
    pub fn entry_count(&self) -> usize {
        self.checksums().map_or(0, Map::len)
    }

    /// Hash every recorded file under `base` and return the entries whose
    /// recorded value differs, in manifest order.
    ///
    /// `on_entry` is called once per entry before it is hashed.  A file that
    /// cannot be read aborts the scan.
    pub fn drift<F>(&self, base: &Path, mut on_entry: Option<F>) -> Result<Vec<Drift>>
    where
        F: FnMut(&str),
    {
        let Some(checksums) = self.checksums() else {
            return Ok(Vec::new());
        };

        let mut drifted = Vec::new();
        for (file, recorded) in checksums {
            if let Some(ref mut callback) = on_entry {
                callback(file);
            }
            let actual = compute_checksum(&resolve_entry(base, file))?;
            let recorded = recorded.as_str();
            tracing::debug!(file = %file, ?recorded, %actual, "compared checksum");
            if recorded != Some(actual.as_str()) {
                drifted.push(Drift {
                    file: file.clone(),
                    recorded: recorded.map(str::to_owned),
                    actual,
                });
            }
        }
        Ok(drifted)
    }

    /// Record `checksum` for `file`.  No-op when there is no checksum table.
    pub fn set_checksum(&mut self, file: &str, checksum: &str) {
        if let Some(Value::Object(checksums)) = self.document.get_mut(CHECKSUMS_KEY) {
            checksums.insert(file.to_owned(), Value::String(checksum.to_owned()));
        }
    }

    /// Serialize with one-tab indentation and no trailing newline, the way the
    /// editor ships the file.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.document.serialize(&mut ser).map_err(FixError::Serialize)?;
        Ok(buf)
    }
}

/// Map a slash-separated manifest key onto the filesystem below `base`.
pub fn resolve_entry(base: &Path, file: &str) -> PathBuf {
    file.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}
