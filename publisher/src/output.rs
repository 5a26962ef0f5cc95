//! Terminal output and process exit handling for the binaries.

use crate::error::{PublishError, Result};
use crate::pipeline::Outcome;
use camino::Utf8PathBuf;
use log::Level;
use std::io::Write;

/// Install the global logger.
///
/// Verbosity follows `RUST_LOG` and defaults to `info`. Informational
/// records print as bare lines so progress reads like a build log; other
/// levels carry a lowercase level prefix. Calling this twice is harmless.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    let installed = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            if record.level() == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                let level = record.level().as_str().to_ascii_lowercase();
                writeln!(buf, "{level}: {}", record.args())
            }
        })
        .try_init();
    if installed.is_err() {
        // A logger is already installed; keep it.
    }
}

/// Write `message` and a newline to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; nothing sensible to do on failure.
    }
}

/// Map a run result to a process exit code, reporting any error.
#[must_use]
pub fn exit_code_for_run_result<T>(result: Result<T>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => {
            write_stderr_line(stderr, format_args!("error: {err}"));
            1
        }
    }
}

/// Describe how a publish run ended.
///
/// # Examples
///
/// ```
/// use release_publisher::output::outcome_summary;
/// use release_publisher::pipeline::Outcome;
///
/// let outcome = Outcome::Skipped { tag: "main".to_owned() };
/// assert_eq!(outcome_summary(&outcome), "main is not a release tag, nothing to publish");
/// ```
#[must_use]
pub fn outcome_summary(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Skipped { tag } => format!("{tag} is not a release tag, nothing to publish"),
        Outcome::Published { release, assets } => {
            let count = assets.len();
            let plural = if count == 1 { "asset" } else { "assets" };
            let location = release.html_url.as_deref().unwrap_or(&release.tag_name);
            format!("Published {count} {plural} to {location}")
        }
    }
}

/// Return the current directory as a UTF-8 path.
///
/// # Errors
///
/// Returns [`PublishError::Io`] if the directory cannot be determined or is
/// not valid UTF-8.
pub fn current_dir_utf8() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir()?;
    Utf8PathBuf::try_from(dir).map_err(|e| PublishError::Io(e.into_io_error()))
}
