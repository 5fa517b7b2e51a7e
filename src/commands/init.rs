//! `fix-checksums init` — scaffold a config file.
//!
//! The generated file sets `install_root` when an installation was found,
//! and leaves every other setting commented out at its default.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use console::style;

/// Render the starter config.
pub fn template(install_root: Option<&Path>) -> String {
    let root_line = match install_root {
        Some(root) => format!("install_root  = {:?}", root.display().to_string()),
        None => "# install_root  = \"/usr/share/code/resources/app\"".to_string(),
    };

    format!(
        "\
# fix-checksums configuration

[editor]
{root_line}
# checksum_base = \"out\"
# version       = \"1.95.3\"   # default: read from <install_root>/package.json

[privilege]
# auto | pkexec | sudo | doas | osascript | powershell | none
method = \"auto\"
"
    )
}

/// Write the starter config to `path`.  Refuses to overwrite.
pub fn run(path: &Path, install_root: Option<&Path>) -> Result<()> {
    if path.exists() {
        bail!(
            "{} already exists; refusing to overwrite it",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    fs::write(path, template(install_root))
        .with_context(|| format!("writing {}", path.display()))?;

    println!(
        "  {}  wrote {}",
        style("✓").green().bold(),
        style(path.display()).bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartialConfig;

    #[test]
    fn template_parses_as_config() {
        let layer: PartialConfig = toml::from_str(&template(None)).unwrap();
        assert!(layer.editor.install_root.is_none());
        assert_eq!(
            layer.privilege.method,
            Some(crate::elevate::ElevationMethod::Auto)
        );
    }

    #[test]
    fn template_records_detected_root() {
        let root = Path::new("/opt/Visual Studio Code/resources/app");
        let layer: PartialConfig = toml::from_str(&template(Some(root))).unwrap();
        assert_eq!(layer.editor.install_root.as_deref(), Some(root));
    }

    #[test]
    fn creates_file_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fix-checksums.toml");

        run(&path, None).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[editor]"));

        fs::write(&path, "# mine").unwrap();
        let err = run(&path, None).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");
    }
}
