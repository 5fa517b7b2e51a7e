//! `fix-checksums apply` — record the current hashes in `product.json`.
//!
//! # Steps
//!
//! 1. Load the manifest fresh from disk.
//! 2. No `checksums` table → unchanged.
//! 3. Hash every listed file; collect the ones that drifted.
//! 4. Nothing drifted → unchanged (no backup, no write).
//! 5. Otherwise serialize the patched manifest.  If this editor version has
//!    no backup yet, *move* the current manifest to the backup path first, so
//!    the backup is always the pre-patch file.  Then write the new manifest.
//!
//! Each step finishes before the next one starts.  A failure after the move
//! but before the write leaves only the backup behind; `restore` copes with
//! that (see [`super::restore`]).

use crate::{
    error::Result,
    fs_ops::FileOps,
    install::Installation,
    manifest::Manifest,
    ui::{self, Change, Outcome},
};

/// Run `apply` and collapse any error into the generic failure outcome.
pub fn run(install: &Installation, ops: &FileOps<'_>) -> Outcome {
    Outcome::from_result(apply(install, ops))
}

pub fn apply(install: &Installation, ops: &FileOps<'_>) -> Result<Outcome> {
    let manifest_path = install.manifest_path();
    let mut manifest = Manifest::load(&manifest_path)?;

    if manifest.checksums().is_none() {
        tracing::info!(path = %manifest_path.display(), "manifest has no checksums table");
        return Ok(Outcome::Unchanged);
    }

    let progress = ui::hash_progress(manifest.entry_count() as u64);
    let drift = manifest.drift(
        install.checksum_base(),
        Some(|file: &str| {
            progress.set_message(file.to_owned());
            progress.inc(1);
        }),
    );
    progress.finish_and_clear();
    let drift = drift?;

    if drift.is_empty() {
        return Ok(Outcome::Unchanged);
    }

    for entry in &drift {
        tracing::info!(file = %entry.file, actual = %entry.actual, "checksum drifted");
        manifest.set_checksum(&entry.file, &entry.actual);
    }
    let json = manifest.to_json_bytes()?;

    let backup_path = install.backup_path();
    if !backup_path.exists() {
        ops.rename(&manifest_path, &backup_path)?;
    }
    ops.write(&manifest_path, &json)?;

    Ok(Outcome::Changed(Change::Applied))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        checksum::{compute_checksum, hash_bytes},
        error::ErrorKind,
        manifest::resolve_entry,
        test_support::{
            DisabledElevator, FailingElevator, Fixture, Recorded, RecordingElevator,
        },
    };

    const ORIGINAL: &str = r#"{
	"nameShort": "Code",
	"checksums": {
		"out/main.js": "abc"
	}
}"#;

    fn plain_ops() -> FileOps<'static> {
        FileOps::new(&DisabledElevator)
    }

    #[test]
    fn drifted_hash_is_recorded_and_backup_created() {
        let fx = Fixture::new();
        fx.write_file("out/main.js", "patched by another extension");
        fx.write_manifest(ORIGINAL);

        let outcome = apply(&fx.install, &plain_ops()).unwrap();

        assert!(matches!(outcome, Outcome::Changed(Change::Applied)));
        assert_eq!(fx.backup().as_deref(), Some(ORIGINAL));
        let expected = format!(
            "{{\n\t\"nameShort\": \"Code\",\n\t\"checksums\": {{\n\t\t\"out/main.js\": \"{}\"\n\t}}\n}}",
            hash_bytes(b"patched by another extension")
        );
        assert_eq!(fx.manifest(), expected);
    }

    #[test]
    fn matching_manifest_is_left_alone() {
        let fx = Fixture::new();
        fx.write_file("out/main.js", "pristine");
        let json = format!(r#"{{"checksums": {{"out/main.js": "{}"}}}}"#, hash_bytes(b"pristine"));
        fx.write_manifest(&json);

        let outcome = apply(&fx.install, &plain_ops()).unwrap();

        assert!(matches!(outcome, Outcome::Unchanged));
        assert!(fx.backups().is_empty());
        // Not even reformatted.
        assert_eq!(fx.manifest(), json);
    }

    #[test]
    fn missing_checksum_table_is_unchanged() {
        let fx = Fixture::new();
        fx.write_manifest(r#"{"nameShort": "Code"}"#);

        let outcome = apply(&fx.install, &plain_ops()).unwrap();
        assert!(matches!(outcome, Outcome::Unchanged));
        assert!(fx.backups().is_empty());
    }

    #[test]
    fn second_apply_is_unchanged() {
        let fx = Fixture::new();
        fx.write_file("out/main.js", "patched");
        fx.write_file("out/other.js", "also patched");
        fx.write_manifest(r#"{"checksums": {"out/main.js": "abc", "out/other.js": "def"}}"#);

        let first = apply(&fx.install, &plain_ops()).unwrap();
        let after_first = fx.manifest();
        let second = apply(&fx.install, &plain_ops()).unwrap();

        assert!(matches!(first, Outcome::Changed(Change::Applied)));
        assert!(matches!(second, Outcome::Unchanged));
        assert_eq!(fx.manifest(), after_first);
    }

    #[test]
    fn every_recorded_hash_matches_after_apply() {
        let fx = Fixture::new();
        fx.write_file("out/a.js", "a");
        fx.write_file("out/vs/b.js", "b");
        fx.write_file("out/vs/c.css", "c");
        fx.write_manifest(&format!(
            r#"{{"checksums": {{"out/a.js": "x", "out/vs/b.js": "{}", "out/vs/c.css": "y"}}}}"#,
            hash_bytes(b"b")
        ));

        apply(&fx.install, &plain_ops()).unwrap();

        let manifest = Manifest::load(&fx.install.manifest_path()).unwrap();
        for (file, recorded) in manifest.checksums().unwrap() {
            let actual = compute_checksum(&resolve_entry(fx.install.checksum_base(), file)).unwrap();
            assert_eq!(recorded.as_str(), Some(actual.as_str()), "{file}");
        }
    }

    #[test]
    fn existing_backup_is_kept_on_reapply() {
        let fx = Fixture::new();
        fx.write_file("out/main.js", "v1");
        fx.write_manifest(ORIGINAL);
        apply(&fx.install, &plain_ops()).unwrap();

        // Another extension changes the file again.
        fx.write_file("out/main.js", "v2");
        let outcome = apply(&fx.install, &plain_ops()).unwrap();

        assert!(matches!(outcome, Outcome::Changed(Change::Applied)));
        assert_eq!(fx.backup().as_deref(), Some(ORIGINAL));
        assert_eq!(fx.backups(), vec![format!("product.json.orig.{}", fx.install.version())]);
        assert!(fx.manifest().contains(&hash_bytes(b"v2")));
    }

    #[test]
    fn missing_installed_file_is_a_read_error() {
        let fx = Fixture::new();
        fx.write_manifest(ORIGINAL);

        let err = apply(&fx.install, &plain_ops()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Read);
        // Nothing moved.
        assert_eq!(fx.manifest(), ORIGINAL);
        assert!(fx.backups().is_empty());
    }

    #[test]
    fn missing_manifest_is_a_read_error() {
        let fx = Fixture::new();
        let outcome = run(&fx.install, &plain_ops());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Read));
    }

    #[test]
    fn malformed_manifest_is_a_parse_error() {
        let fx = Fixture::new();
        fx.write_manifest("{ not json");
        let outcome = run(&fx.install, &plain_ops());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Parse));
    }

    #[test]
    fn failed_backup_move_falls_back_to_privileged_move() {
        let fx = Fixture::with_unreachable_backup();
        fx.write_file("out/main.js", "patched");
        fx.write_manifest(ORIGINAL);

        let elevator = RecordingElevator::default();
        let outcome = apply(&fx.install, &FileOps::new(&elevator)).unwrap();

        assert!(matches!(outcome, Outcome::Changed(Change::Applied)));
        // The recorder does not actually move anything, so the follow-up
        // write lands on the manifest file directly.
        assert_eq!(elevator.calls(), vec![Recorded::Move {
            from: fx.install.manifest_path(),
            to: fx.install.backup_path(),
        }]);
        assert!(fx.manifest().contains(&hash_bytes(b"patched")));
    }

    #[test]
    fn declined_prompt_is_a_privileged_failure() {
        let fx = Fixture::with_unreachable_backup();
        fx.write_file("out/main.js", "patched");
        fx.write_manifest(ORIGINAL);

        let outcome = run(&fx.install, &FileOps::new(&FailingElevator));

        assert_eq!(outcome.error_kind(), Some(ErrorKind::Privileged));
        assert_eq!(fx.manifest(), ORIGINAL);
        assert!(fx.backup().is_none());
    }

    #[test]
    fn disabled_elevation_fails_on_backup_move() {
        let fx = Fixture::with_unreachable_backup();
        fx.write_file("out/main.js", "patched");
        fx.write_manifest(ORIGINAL);

        let outcome = run(&fx.install, &plain_ops());
        assert!(matches!(
            outcome,
            Outcome::Failed(crate::error::FixError::ElevationDisabled {
                label: "File Renamer",
                ..
            })
        ));
        assert_eq!(fx.manifest(), ORIGINAL);
    }
}
