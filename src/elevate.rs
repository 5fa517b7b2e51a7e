//! Privileged execution of plain file commands.
//!
//! This module never escalates anything itself.  It *builds* the OS command
//! that performs a copy/delete/move (`cp -f`, `rm -f`, `mv -f`, or the
//! `cmd.exe` builtins on Windows) and wraps it in whatever prompt mechanism
//! the platform offers:
//!
//! | Method       | Wrapper                                                     |
//! |--------------|-------------------------------------------------------------|
//! | `pkexec`     | `pkexec <cmd…>` (polkit dialog)                             |
//! | `sudo`       | `sudo -p "[<label>] password for %u: " -- <cmd…>`           |
//! | `doas`       | `doas <cmd…>`                                               |
//! | `osascript`  | `do shell script "…" with administrator privileges`         |
//! | `powershell` | `Start-Process cmd.exe -Verb RunAs -Wait -PassThru`         |
//! | `none`       | no fallback at all                                          |
//!
//! Argument construction is pure and unit-tested; execution goes through
//! [`Elevate`] so the file helpers can be tested without a real prompt.

use std::{
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

use serde::{Deserialize, Serialize};

use crate::error::{FixError, Result};

// ─── Method ───────────────────────────────────────────────────────────────────

/// How privileged commands are run.  `auto` picks the platform default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMethod {
    #[default]
    Auto,
    Pkexec,
    Sudo,
    Doas,
    Osascript,
    Powershell,
    None,
}

impl ElevationMethod {
    /// Replace `Auto` with the host platform's prompt mechanism.
    pub const fn resolve(self) -> Self {
        match self {
            Self::Auto if cfg!(target_os = "macos") => Self::Osascript,
            Self::Auto if cfg!(windows) => Self::Powershell,
            Self::Auto => Self::Pkexec,
            other => other,
        }
    }
}

/// Shell family the plain file commands are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub const fn host() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }
}

// ─── File commands ────────────────────────────────────────────────────────────

/// One privileged file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCommand<'a> {
    /// Overwrite `to` with the contents of `from` (used for writes, via a
    /// staged temporary file).
    Copy { from: &'a Path, to: &'a Path },
    Delete { path: &'a Path },
    Move { from: &'a Path, to: &'a Path },
}

impl FileCommand<'_> {
    /// Name shown on the elevation prompt.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Copy { .. } => "File Writer",
            Self::Delete { .. } => "File Deleter",
            Self::Move { .. } => "File Renamer",
        }
    }

    /// The unprivileged command line, e.g. `["cp", "-f", from, to]`.
    pub fn argv(&self, platform: Platform) -> Vec<String> {
        let mut cmd: Vec<String> = match platform {
            Platform::Unix => Vec::new(),
            Platform::Windows => vec!["cmd".into(), "/C".into()],
        };
        let (verb, force): (&str, &[&str]) = match (self, platform) {
            (Self::Copy { .. }, Platform::Unix) => ("cp", &["-f"]),
            (Self::Delete { .. }, Platform::Unix) => ("rm", &["-f"]),
            (Self::Move { .. }, Platform::Unix) => ("mv", &["-f"]),
            (Self::Copy { .. }, Platform::Windows) => ("copy", &["/y"]),
            (Self::Delete { .. }, Platform::Windows) => ("del", &["/f", "/q"]),
            (Self::Move { .. }, Platform::Windows) => ("move", &["/y"]),
        };
        cmd.push(verb.into());
        cmd.extend(force.iter().map(|f| (*f).to_string()));
        match self {
            Self::Copy { from, to } | Self::Move { from, to } => {
                cmd.push(path_arg(from));
                cmd.push(path_arg(to));
            },
            Self::Delete { path } => cmd.push(path_arg(path)),
        }
        cmd
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ─── Wrapping ─────────────────────────────────────────────────────────────────

/// Wrap `cmd` in the prompt mechanism for `method`.
///
/// Returns `None` when elevation is disabled.
pub fn privileged_argv(
    method: ElevationMethod,
    cmd: &FileCommand<'_>,
    platform: Platform,
) -> Option<Vec<String>> {
    let inner = cmd.argv(platform);
    let label = cmd.label();

    let wrapped = match method.resolve() {
        ElevationMethod::Pkexec => prefixed(&["pkexec"], inner),
        ElevationMethod::Doas => prefixed(&["doas"], inner),
        ElevationMethod::Sudo => {
            let prompt = format!("[{label}] password for %u: ");
            prefixed(&["sudo", "-p", &prompt, "--"], inner)
        },
        ElevationMethod::Osascript => {
            let shell = inner
                .iter()
                .map(|a| sh_quote(a))
                .collect::<Vec<_>>()
                .join(" ");
            let script = format!(
                "do shell script \"{}\" with prompt \"{label} needs administrator privileges.\" \
                 with administrator privileges",
                applescript_escape(&shell)
            );
            vec!["osascript".into(), "-e".into(), script]
        },
        ElevationMethod::Powershell => {
            // Start-Process always launches cmd.exe, whatever the host, so
            // the command line is the cmd.exe form: `/C <verb> <flags…> <paths…>`.
            let cmd_line = cmd
                .argv(Platform::Windows)
                .iter()
                .skip(1)
                .map(|a| if a.starts_with('/') && a.len() <= 2 { a.clone() } else { cmd_quote(a) })
                .collect::<Vec<_>>()
                .join(" ");
            let script = format!(
                "$p = Start-Process -FilePath 'cmd.exe' -ArgumentList '{}' -Verb RunAs -Wait \
                 -PassThru -WindowStyle Hidden; exit $p.ExitCode",
                cmd_line.replace('\'', "''")
            );
            vec![
                "powershell".into(),
                "-NoProfile".into(),
                "-NonInteractive".into(),
                "-Command".into(),
                script,
            ]
        },
        ElevationMethod::None | ElevationMethod::Auto => return None,
    };
    Some(wrapped)
}

fn prefixed(prefix: &[&str], inner: Vec<String>) -> Vec<String> {
    prefix.iter().map(|p| (*p).to_string()).chain(inner).collect()
}

/// POSIX single-quote `arg` for `sh -c`.
fn sh_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', "\\\"")
}

/// Double-quote `arg` for cmd.exe unless it is a bare word.
fn cmd_quote(arg: &str) -> String {
    if arg.chars().all(|c| c.is_ascii_alphanumeric()) {
        arg.to_string()
    } else {
        format!("\"{arg}\"")
    }
}

// ─── Execution ────────────────────────────────────────────────────────────────

/// Runs a [`FileCommand`] with elevated privileges.
pub trait Elevate {
    /// `false` when there is no privileged fallback at all.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Run `cmd` and wait for it to exit.
    fn run(&self, cmd: &FileCommand<'_>) -> Result<()>;
}

/// The real thing: spawns the wrapped command and waits for the prompt (and
/// the command behind it) to finish.
#[derive(Debug, Clone, Copy)]
pub struct SystemElevator {
    method: ElevationMethod,
    platform: Platform,
}

impl SystemElevator {
    pub const fn new(method: ElevationMethod) -> Self {
        Self {
            method: method.resolve(),
            platform: Platform::host(),
        }
    }
}

impl Elevate for SystemElevator {
    fn is_enabled(&self) -> bool {
        self.method != ElevationMethod::None
    }

    fn run(&self, cmd: &FileCommand<'_>) -> Result<()> {
        let label = cmd.label();
        let Some(args) = privileged_argv(self.method, cmd, self.platform) else {
            return Err(FixError::ElevationFailed {
                label,
                detail: "elevation is disabled".into(),
            });
        };

        tracing::debug!(label, ?args, "spawning privileged command");
        let (status, stdout, stderr) =
            run_captured(&args).map_err(|source| FixError::ElevationSpawn {
                label,
                program: args[0].clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            let output = if stderr.trim().is_empty() { stdout } else { stderr };
            Err(FixError::ElevationFailed {
                label,
                detail: format!("{status}: {}", output.trim()),
            })
        }
    }
}

/// Run a command, capturing both stdout and stderr.
///
/// Returns `(status, stdout_text, stderr_text)`.
pub fn run_captured(args: &[String]) -> std::io::Result<(ExitStatus, String, String)> {
    let (prog, rest) = args.split_first().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "cannot run an empty command")
    })?;

    let output = Command::new(prog)
        .args(rest)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;

    Ok((
        output.status,
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    ))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
