//! Typed errors for the apply / restore / cleanup handlers.
//!
//! Every fatal failure ends up as one [`FixError`].  The handlers never let it
//! escape to the user as-is: it is logged, then collapsed into the single
//! generic error notification (see [`crate::ui::Outcome`]).  Keeping the
//! variant around means tests can assert on *what* went wrong via
//! [`FixError::kind`] instead of matching message text.
//!
//! Unprivileged write/delete/move failures never show up here — they are
//! absorbed by [`crate::fs_ops`] and turned into a privileged retry.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Coarse classification of a [`FixError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A manifest, target file, or directory could not be read.
    Read,
    /// A manifest or `package.json` was read but is not what we expect.
    Parse,
    /// The privileged fallback failed or was not available.
    Privileged,
}

#[derive(Error, Debug)]
pub enum FixError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("could not determine the editor version from {}", path.display())]
    VersionUnknown { path: PathBuf },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to stage {} for a privileged copy: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{label}: elevation is disabled and the plain operation failed: {source}")]
    ElevationDisabled {
        label: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{label}: failed to spawn `{program}`: {source}")]
    ElevationSpawn {
        label: &'static str,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{label}: privileged command exited non-zero: {detail}")]
    ElevationFailed { label: &'static str, detail: String },
}

impl FixError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::Read,
            Self::Parse { .. }
            | Self::NotAnObject { .. }
            | Self::VersionUnknown { .. }
            | Self::Serialize(_) => ErrorKind::Parse,
            Self::Staging { .. }
            | Self::ElevationDisabled { .. }
            | Self::ElevationSpawn { .. }
            | Self::ElevationFailed { .. } => ErrorKind::Privileged,
        }
    }
}

pub type Result<T> = std::result::Result<T, FixError>;
