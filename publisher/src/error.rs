//! Error types for the release publisher.
//!
//! Every fatal condition in the pipeline maps to one variant here. The only
//! failure that never reaches this type is a release-creation conflict, which
//! the publisher logs and recovers from.

use crate::archive::ArchiveError;
use crate::config::ConfigError;
use crate::release::ReleaseApiError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a publish or package run.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The project configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The credential environment variable is unset or empty.
    #[error("{variable} is not set; export a token with permission to create releases")]
    MissingCredential {
        /// Name of the environment variable that was consulted.
        variable: String,
    },

    /// An input value was rejected before any work started.
    #[error(transparent)]
    Input(#[from] InputError),

    /// An external command could not be started.
    #[error("failed to run `{command}`: {source}")]
    CommandSpawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed with {status}")]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// Human-readable exit status.
        status: String,
    },

    /// A file could not be copied into the staging directory.
    #[error("failed to copy {from} to {to}: {source}")]
    CopyFailed {
        /// Source path.
        from: Utf8PathBuf,
        /// Destination path.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The staging directory could not be created.
    #[error("failed to create staging directory {path}: {source}")]
    StagingFailed {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Archive creation failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The packaging tool produced no output path.
    #[error("`{command}` did not report a package path")]
    PackageOutputMissing {
        /// The packaging command that was run.
        command: String,
    },

    /// No release exists for the tag, even after attempting to create it.
    #[error("no release found for tag {tag}")]
    ReleaseNotFound {
        /// The tag that was looked up.
        tag: String,
    },

    /// Uploading an artefact to the release failed.
    #[error("failed to upload {name}: {source}")]
    UploadFailed {
        /// Display name of the artefact.
        name: String,
        /// The remote failure.
        #[source]
        source: ReleaseApiError,
    },

    /// A remote release API call failed.
    #[error(transparent)]
    Release(#[from] ReleaseApiError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Errors arising from invalid tags, versions, platforms, or artefact paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The tag does not carry the publishable-release prefix.
    #[error("tag \"{tag}\" does not start with '{prefix}'")]
    NotPublishable {
        /// The rejected tag.
        tag: String,
        /// The required prefix character.
        prefix: char,
    },

    /// A version string is empty or contains characters unsafe in a path.
    #[error("invalid version \"{value}\": {reason}")]
    InvalidVersion {
        /// The rejected version.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// A platform identifier is empty or contains characters unsafe in a
    /// path.
    #[error("invalid platform \"{value}\": {reason}")]
    InvalidPlatform {
        /// The rejected platform identifier.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },

    /// An artefact path has no file name to upload it under.
    #[error("artefact path has no file name: {0}")]
    InvalidArtefactPath(Utf8PathBuf),
}

/// Result type alias using [`PublishError`].
pub type Result<T> = std::result::Result<T, PublishError>;
