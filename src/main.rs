//! `fix-checksums` — keep VS Code's integrity check quiet after local patches.
//!
//! # Overview
//!
//! VS Code records a SHA-256 of its core files in `product.json` and
//! complains ("installation appears to be corrupt") when they no longer
//! match.  Extensions that patch those files trigger the warning on every
//! start.  This tool recomputes the hashes and writes them back, keeping the
//! original manifest as `product.json.orig.<version>` so it can be restored.
//!
//! # Usage
//!
//! ```text
//! fix-checksums                  # show which checksums drifted
//! fix-checksums apply            # record current hashes (backs up first)
//! fix-checksums restore          # put the original product.json back
//! fix-checksums init             # scaffold fix-checksums.toml
//! fix-checksums --print-config   # show resolved config without running anything
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                                  |
//! |--------------------------|-------------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap                   |
//! | [`config`]               | Layered `Config` + TOML loader                  |
//! | [`install`]              | Installation paths, version, backup naming      |
//! | [`manifest`]             | `product.json` load / drift / rewrite           |
//! | [`checksum`]             | SHA-256 → unpadded base64                       |
//! | [`fs_ops`]               | Write / delete / move with privileged fallback  |
//! | [`elevate`]              | Privileged command construction and execution   |
//! | [`ui`]                   | The single notification, hashing progress       |
//! | [`commands`]             | `apply`, `restore`, `status`, `init`, cleanup   |

mod checksum;
mod cli;
mod commands;
mod config;
mod elevate;
mod error;
mod fs_ops;
mod install;
mod manifest;
#[cfg(test)]
mod test_support;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Subcommand};
use config::{Config, PartialConfig, global_config_path, parse_partial};
use elevate::SystemElevator;
use fs_ops::FileOps;
use install::{Installation, candidate_roots, detect_version, find_install_root};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = load_merged_config(&cli)?;

    if cli.print_config {
        println!("{cfg:#?}");
        return Ok(());
    }

    // ── fix-checksums init ────────────────────────────────────────────────────
    if cli.command == Some(Subcommand::Init) {
        let root = cfg
            .editor
            .install_root
            .clone()
            .or_else(|| find_install_root(&candidate_roots()));
        return commands::init::run(&cli.config, root.as_deref());
    }

    let install = resolve_installation(&cfg)?;
    tracing::info!(
        root = %install.root().display(),
        version = install.version(),
        "using VS Code installation"
    );

    let elevator = SystemElevator::new(cfg.privilege.method);
    let ops = FileOps::new(&elevator);

    let outcome = match cli.command {
        // ── fix-checksums [status] ────────────────────────────────────────────
        None | Some(Subcommand::Status) => {
            let report = commands::status::run(&install)
                .with_context(|| format!("checking {}", install.manifest_path().display()))?;
            report.print();
            if !report.in_sync() {
                std::process::exit(1);
            }
            return Ok(());
        },

        // ── fix-checksums apply / restore ─────────────────────────────────────
        Some(Subcommand::Apply) => {
            sweep(&cli, &install, &ops);
            commands::apply::run(&install, &ops)
        },
        Some(Subcommand::Restore) => {
            sweep(&cli, &install, &ops);
            commands::restore::run(&install, &ops)
        },
        Some(Subcommand::Init) => unreachable!("handled above"),
    };

    outcome.print();
    if let Some(kind) = outcome.error_kind() {
        tracing::debug!(?kind, "exiting with failure");
        std::process::exit(1);
    }
    Ok(())
}

/// Startup removal of other versions' backups.  Silent apart from logs.
fn sweep(cli: &Cli, install: &Installation, ops: &FileOps<'_>) {
    if cli.no_cleanup {
        return;
    }
    let report = commands::cleanup::run(install, ops);
    tracing::debug!(
        removed = report.removed.len(),
        failed = report.failed.len(),
        "backup cleanup finished"
    );
}

/// `RUST_LOG` wins; otherwise `-v` / `-vv` pick the level.  Logs go to stderr
/// so the notification on stdout stays clean.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration from three layers and merge them.
///
/// 1. `~/.config/fix-checksums/config.toml` — global defaults
/// 2. `--config` (default: `./fix-checksums.toml`) — per-directory overrides
/// 3. command-line flags
///
/// Later layers win on a per-field basis.  Either file may be absent.
fn load_merged_config(cli: &Cli) -> Result<Config> {
    let global_path = global_config_path();

    let global: PartialConfig = match global_path.as_deref() {
        Some(p) => parse_partial(p)?.unwrap_or_default(),
        None => PartialConfig::default(),
    };
    let local: PartialConfig = parse_partial(&cli.config)?.unwrap_or_default();

    tracing::debug!(global = ?global_path, local = %cli.config.display(), "config sources");
    Ok(global.merge(local).merge(PartialConfig::from(cli)).resolve())
}

/// Turn the configured (or detected) install root and version into an
/// [`Installation`].
fn resolve_installation(cfg: &Config) -> Result<Installation> {
    let root = match &cfg.editor.install_root {
        Some(root) => root.clone(),
        None => find_install_root(&candidate_roots()).context(
            "could not find a VS Code installation; pass --install-root or set \
             [editor].install_root in the config file",
        )?,
    };

    let version = match &cfg.editor.version {
        Some(version) => version.clone(),
        None => detect_version(&root).context("pass --editor-version to set it explicitly")?,
    };

    Ok(Installation::new(root, &cfg.editor.checksum_base, version))
}
