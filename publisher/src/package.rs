//! Debian package creation via `cargo deb`.
//!
//! The packaging subcommand is installed on demand: a `--version` probe
//! decides whether `cargo install cargo-deb` runs first. The package path is
//! read from the last line `cargo deb` prints.

use crate::command::{CommandRunner, capture_output, command_line, run, run_soft};
use crate::error::{PublishError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;

const CARGO: &str = "cargo";
const PACKAGE_ARGS: &[&str] = &["deb"];
const PROBE_ARGS: &[&str] = &["deb", "--version"];
const INSTALL_ARGS: &[&str] = &["install", "cargo-deb"];

/// Whether the `cargo deb` subcommand answers its version probe.
///
/// # Errors
///
/// Returns an error only if `cargo` itself cannot be started.
pub fn is_packager_installed(runner: &dyn CommandRunner) -> Result<bool> {
    Ok(run_soft(runner, CARGO, PROBE_ARGS)?.success())
}

/// Install `cargo-deb` unless it is already available.
///
/// # Errors
///
/// Returns [`PublishError::CommandFailed`] if the installation fails.
pub fn ensure_packager(runner: &dyn CommandRunner) -> Result<()> {
    if is_packager_installed(runner)? {
        return Ok(());
    }
    info!("cargo-deb not found, installing it");
    run(runner, CARGO, INSTALL_ARGS)
}

/// Build a Debian package for the project at `root` and return its path.
///
/// A relative path reported by the tool is resolved against `root`.
///
/// # Errors
///
/// Returns [`PublishError::CommandFailed`] if installing or running the
/// packager fails, or [`PublishError::PackageOutputMissing`] if it prints
/// nothing.
pub fn build_package(runner: &dyn CommandRunner, root: &Utf8Path) -> Result<Utf8PathBuf> {
    ensure_packager(runner)?;
    let stdout = capture_output(runner, CARGO, PACKAGE_ARGS)?;
    let reported = stdout
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .ok_or_else(|| PublishError::PackageOutputMissing {
            command: command_line(CARGO, PACKAGE_ARGS),
        })?;
    Ok(root.join(reported))
}
