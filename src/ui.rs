//! Terminal output — the one notification per command, plus the hashing
//! progress bar.
//!
//! Every `apply` / `restore` ends in exactly one [`Outcome`] and exactly one
//! message from a fixed set.  Whatever went wrong internally is logged via
//! `tracing`; the user only ever sees the generic error text.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{ErrorKind, FixError, Result};

// ─── Messages ─────────────────────────────────────────────────────────────────

pub const UNCHANGED: &str = "No changes to checksums were necessary.";
pub const ERROR: &str = "An error occurred during execution.";
pub const ERROR_HINT: &str = "Make sure you have write access to the VS Code installation.";

fn changed(verb: &str) -> String {
    format!("Checksums {verb}. Please restart VS Code to see the effect.")
}

/// Green ✓ — changed or nothing to do.
fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
/// Red ✗ — generic failure.
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}

// ─── Outcome ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Applied,
    Restored,
}

impl Change {
    const fn verb(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Restored => "restored",
        }
    }
}

/// Result of one command invocation, as the user sees it.
#[derive(Debug)]
pub enum Outcome {
    Changed(Change),
    Unchanged,
    Failed(FixError),
}

impl Outcome {
    /// Collapse a handler result into an outcome, logging the error if any.
    pub fn from_result(result: Result<Self>) -> Self {
        result.unwrap_or_else(|err| {
            tracing::error!(kind = ?err.kind(), "{err}");
            Self::Failed(err)
        })
    }

    /// The user-facing text.
    pub fn message(&self) -> String {
        match self {
            Self::Changed(change) => changed(change.verb()),
            Self::Unchanged => UNCHANGED.to_string(),
            Self::Failed(_) => format!("{ERROR}\n{ERROR_HINT}"),
        }
    }

    /// Kind of the underlying error, for failed outcomes.
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failed(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn print(&self) {
        match self {
            Self::Changed(_) => println!("  {}  {}", icon_ok(), style(self.message()).bold()),
            Self::Unchanged => println!("  {}  {}", icon_ok(), self.message()),
            Self::Failed(_) => {
                println!("  {}  {}", icon_err(), style(ERROR).red().bold());
                println!("     {}", style(ERROR_HINT).dim());
            },
        }
    }
}

// ─── Progress ─────────────────────────────────────────────────────────────────

/// Progress bar for hashing `total` manifest entries.  Draws to stderr and
/// stays invisible when stderr is not a terminal.
pub fn hash_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan}  Hashing {pos}/{len} {wide_msg:.dim}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
    );
    pb
}

// ─── Tests ────────────────────────────────────────────────────────────────────
