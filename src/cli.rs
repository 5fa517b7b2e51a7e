//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The `Cli` struct is parsed once in `main`; its
//! override flags become the top configuration layer (see
//! [`crate::config::PartialConfig`]).

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Top-level CLI arguments, shared across every subcommand.
#[derive(Parser, Debug)]
#[command(
    name    = "fix-checksums",
    about   = "Adjust VS Code's product.json checksums after local modifications",
    version,
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}"
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Path to the local configuration file.
    ///
    /// Values here override `~/.config/fix-checksums/config.toml`.  The file
    /// is optional.
    #[arg(short, long, default_value = "fix-checksums.toml", global = true)]
    pub config: PathBuf,

    /// Subcommand to run.  Omit to print the checksum status.
    #[command(subcommand)]
    pub command: Option<Subcommand>,

    /// The editor's `resources/app` directory (the one holding `product.json`).
    ///
    /// Overrides `[editor].install_root`.  Without either, the usual install
    /// locations for this platform are probed.
    #[arg(long, global = true, value_name = "DIR")]
    pub install_root: Option<PathBuf>,

    /// Editor version used to tag the backup file.
    ///
    /// Defaults to the `version` field of `<install-root>/package.json`.
    #[arg(long, global = true, value_name = "VERSION")]
    pub editor_version: Option<String>,

    /// Directory, relative to the install root, that checksum keys refer to.
    #[arg(long, global = true, value_name = "DIR")]
    pub checksum_base: Option<String>,

    /// Never fall back to an administrator prompt.
    ///
    /// A file operation that fails without privileges becomes an error.
    #[arg(long, global = true)]
    pub no_elevate: bool,

    /// Skip the startup sweep that removes backups of other editor versions.
    #[arg(long, global = true)]
    pub no_cleanup: bool,

    /// Print the resolved configuration and exit without running anything.
    #[arg(long)]
    pub print_config: bool,

    /// Log more (`-v` info, `-vv` debug).  `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Explicit subcommands.
#[derive(clap::Subcommand, Debug, PartialEq, Eq)]
pub enum Subcommand {
    /// Record the current hashes of all modified files in product.json.
    ///
    /// The original manifest is kept as `product.json.orig.<version>` the
    /// first time anything changes.
    Apply,

    /// Put the original product.json back from its backup.
    Restore,

    /// Report which files have drifted from their recorded checksums.
    ///
    /// Read-only.  Exits 1 when any file has drifted.
    Status,

    /// Write a starter config file at the `--config` path.
    ///
    /// Exits with an error if the file already exists.
    Init,
}
