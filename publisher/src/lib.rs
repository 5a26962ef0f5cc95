//! Release publisher library.
//!
//! This crate turns a tagged project into platform release artefacts and
//! publishes them. A run builds the project with `cargo build --release`,
//! stages the binary and its documents in `<tool>-<version>-<platform>/`,
//! compresses that directory, builds a Debian package on Linux, and uploads
//! the results to the GitHub release for the tag. It backs the
//! `release-publisher` and `release-package` binaries.
//!
//! # Modules
//!
//! - [`archive`] - zip and tar.gz archive creation
//! - [`cli`] - Command-line argument definitions
//! - [`command`] - External process execution
//! - [`config`] - Project configuration and credentials
//! - [`content_type`] - MIME types for uploaded assets
//! - [`error`] - Error types for every fatal condition
//! - [`output`] - Logging setup and terminal reporting
//! - [`package`] - Debian package creation via `cargo deb`
//! - [`pipeline`] - Release pipeline orchestration
//! - [`platform`] - Platform labels and the decisions derived from them
//! - [`release`] - Remote release creation and asset upload
//! - [`stager`] - Staging directory assembly
//! - [`tag`] - Release tag and version validation

pub mod archive;
pub mod cli;
pub mod command;
pub mod config;
pub mod content_type;
pub mod error;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod stager;
pub mod tag;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
