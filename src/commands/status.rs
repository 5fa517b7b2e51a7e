//! `fix-checksums status` (also the default) — read-only drift report.

use console::style;

use crate::{
    error::Result,
    install::Installation,
    manifest::{Drift, Manifest},
    ui,
};

#[derive(Debug)]
pub struct StatusReport {
    pub version: String,
    /// `None` when the manifest has no checksum table.
    pub entries: Option<usize>,
    pub drift: Vec<Drift>,
    pub has_backup: bool,
    pub stale_backups: usize,
}

impl StatusReport {
    pub fn in_sync(&self) -> bool {
        self.drift.is_empty()
    }

    pub fn print(&self) {
        println!(
            "  {} {}",
            style("VS Code").bold(),
            style(&self.version).cyan()
        );

        match self.entries {
            None => println!("  {}", style("product.json has no checksums table").dim()),
            Some(n) if self.in_sync() => println!(
                "  {}  all {n} checksums match",
                style("✓").green().bold()
            ),
            Some(n) => {
                println!(
                    "  {}  {} of {n} checksums differ",
                    style("✗").red().bold(),
                    self.drift.len()
                );
                for d in &self.drift {
                    println!("     {}", d.file);
                    println!(
                        "       {} {}",
                        style("recorded").dim(),
                        d.recorded.as_deref().unwrap_or("<not a string>")
                    );
                    println!("       {}   {}", style("actual").dim(), d.actual);
                }
            },
        }

        let backup = if self.has_backup { "present" } else { "none" };
        println!("  {} {backup}", style("backup:").dim());
        if self.stale_backups > 0 {
            println!(
                "  {} {} from other versions",
                style("stale backups:").dim(),
                self.stale_backups
            );
        }
    }
}

pub fn run(install: &Installation) -> Result<StatusReport> {
    let manifest = Manifest::load(&install.manifest_path())?;

    let progress = ui::hash_progress(manifest.entry_count() as u64);
    let drift = manifest.drift(
        install.checksum_base(),
        Some(|file: &str| {
            progress.set_message(file.to_owned());
            progress.inc(1);
        }),
    );
    progress.finish_and_clear();

    Ok(StatusReport {
        version: install.version().to_owned(),
        entries: manifest.checksums().map(serde_json::Map::len),
        drift: drift?,
        has_backup: install.has_backup(),
        stale_backups: install.stale_backups()?.len(),
    })
}
