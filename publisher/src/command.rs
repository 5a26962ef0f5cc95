//! External process execution.
//!
//! Every subprocess the pipeline starts (the release build, the packaging
//! tool, its installer) goes through a [`CommandRunner`] so that tests can
//! replace process spawning with scripted results.

use crate::error::{PublishError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::process::{Command, ExitStatus, Output, Stdio};

/// Abstraction for running external commands.
pub trait CommandRunner {
    /// Runs a command with inherited standard streams and returns its exit
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::CommandSpawn`] if the process cannot be
    /// started. A non-zero exit status is not an error at this level.
    fn status(&self, cmd: &str, args: &[&str]) -> Result<ExitStatus>;

    /// Runs a command and captures its standard output. Standard error is
    /// inherited.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::CommandSpawn`] if the process cannot be
    /// started.
    fn output(&self, cmd: &str, args: &[&str]) -> Result<Output>;
}

/// Runs commands on the host system from a fixed working directory.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8PathBuf;
/// use release_publisher::command::{SystemCommandRunner, run};
///
/// let runner = SystemCommandRunner::new(Utf8PathBuf::from("."));
/// run(&runner, "cargo", &["build", "--release"])?;
/// # Ok::<(), release_publisher::error::PublishError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    workdir: Utf8PathBuf,
}

impl SystemCommandRunner {
    /// Create a runner whose commands execute in `workdir`.
    #[must_use]
    pub fn new(workdir: Utf8PathBuf) -> Self {
        Self { workdir }
    }

    /// Return the working directory used for every command.
    #[must_use]
    pub fn workdir(&self) -> &Utf8Path {
        &self.workdir
    }

    fn command(&self, cmd: &str, args: &[&str]) -> Command {
        let mut command = Command::new(cmd);
        command.args(args).current_dir(&self.workdir);
        command
    }
}

impl CommandRunner for SystemCommandRunner {
    fn status(&self, cmd: &str, args: &[&str]) -> Result<ExitStatus> {
        self.command(cmd, args)
            .status()
            .map_err(|source| PublishError::CommandSpawn {
                command: command_line(cmd, args),
                source,
            })
    }

    fn output(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        self.command(cmd, args)
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| PublishError::CommandSpawn {
                command: command_line(cmd, args),
                source,
            })
    }
}

/// Announce and run a command, failing on a non-zero exit status.
///
/// # Errors
///
/// Returns [`PublishError::CommandFailed`] when the command exits
/// unsuccessfully, or any spawn error from the runner.
pub fn run(runner: &dyn CommandRunner, cmd: &str, args: &[&str]) -> Result<()> {
    let command = command_line(cmd, args);
    info!(":: {command}");
    let status = runner.status(cmd, args)?;
    ensure_success(command, status)
}

/// Run a command quietly and hand its exit status back to the caller.
///
/// Used for existence probes, where a non-zero status is an answer rather
/// than a failure.
///
/// # Errors
///
/// Returns an error only if the process cannot be started.
pub fn run_soft(runner: &dyn CommandRunner, cmd: &str, args: &[&str]) -> Result<ExitStatus> {
    runner.status(cmd, args)
}

/// Run a command and return its standard output without trailing
/// whitespace.
///
/// # Errors
///
/// Returns [`PublishError::CommandFailed`] when the command exits
/// unsuccessfully, or any spawn error from the runner.
pub fn capture_output(runner: &dyn CommandRunner, cmd: &str, args: &[&str]) -> Result<String> {
    let command = command_line(cmd, args);
    info!(":: {command}");
    let output = runner.output(cmd, args)?;
    ensure_success(command, output.status)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_owned())
}

/// Render a command and its arguments as a single display string.
#[must_use]
pub fn command_line(cmd: &str, args: &[&str]) -> String {
    std::iter::once(cmd)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn ensure_success(command: String, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(PublishError::CommandFailed {
            command,
            status: status.to_string(),
        })
    }
}
