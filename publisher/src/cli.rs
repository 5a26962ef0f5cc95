//! Command-line argument definitions.
//!
//! Both binaries run from the project root: `release-publisher` performs a
//! full publish, `release-package` only assembles the artefacts.

use clap::Parser;

/// Build, archive, and upload the release artefacts for one platform.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "release-publisher")]
#[command(version, about)]
#[command(long_about = concat!(
    "Build, archive, and upload the release artefacts for one platform.\n\n",
    "Runs `cargo build --release`, stages the binary and project documents in ",
    "<tool>-<version>-<platform>/, compresses it (zip on Windows, tar.gz ",
    "elsewhere), builds a Debian package on Linux, and uploads everything to ",
    "the GitHub release for the tag, creating the release if needed.\n\n",
    "Tags that do not start with 'v' are ignored and the command exits ",
    "successfully. The API token is read from GITHUB_TOKEN unless publish.toml ",
    "names another variable.",
))]
pub struct Cli {
    /// Release tag, e.g. `v1.2.3`.
    #[arg(long)]
    pub tag: String,

    /// Platform label, e.g. `linux-x86_64`, `windows`, or `macos`.
    #[arg(long)]
    pub platform: String,
}

/// Build and archive the release artefacts for one platform into `dist/`
/// without uploading them.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "release-package")]
#[command(disable_version_flag = true)]
pub struct PackageCli {
    /// Version embedded in artefact names, e.g. `1.2.3`.
    #[arg(long)]
    pub version: String,

    /// Platform label, e.g. `linux-x86_64`, `windows`, or `macos`.
    #[arg(long)]
    pub platform: String,
}
