//! Staging directory assembly.
//!
//! A staging directory mirrors the final archive: the release binary plus the
//! project documents, in a directory named `<tool>-<version>-<platform>`.

use crate::error::{InputError, PublishError, Result};
use crate::platform::Platform;
use crate::tag::Version;
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::fs;

/// Copies release files into a per-platform staging directory.
#[derive(Debug, Clone)]
pub struct Stager {
    staging_dir: Utf8PathBuf,
}

impl Stager {
    /// Create a stager for `tool` at `version` on `platform`, rooted at
    /// `root`.
    #[must_use]
    pub fn new(root: &Utf8Path, tool: &str, version: &Version, platform: &Platform) -> Self {
        Self {
            staging_dir: root.join(staging_dir_name(tool, version, platform)),
        }
    }

    /// Return the full path to the staging directory.
    #[must_use]
    pub fn staging_path(&self) -> &Utf8Path {
        &self.staging_dir
    }

    /// Ensure the staging directory exists.
    ///
    /// An existing directory is reused.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::StagingFailed`] if the directory cannot be
    /// created, for example because a file occupies the path.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.staging_dir).map_err(|source| PublishError::StagingFailed {
            path: self.staging_dir.clone(),
            source,
        })
    }

    /// Copy one file into the staging directory under its base name.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::CopyFailed`] if the copy fails, or
    /// [`InputError::InvalidArtefactPath`] if `source` has no file name.
    pub fn stage(&self, source: &Utf8Path) -> Result<Utf8PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| InputError::InvalidArtefactPath(source.to_owned()))?;
        let dest = self.staging_dir.join(file_name);

        info!("{source} -> {dest}");
        fs::copy(source, &dest).map_err(|e| PublishError::CopyFailed {
            from: source.to_owned(),
            to: dest.clone(),
            source: e,
        })?;
        Ok(dest)
    }

    /// Create the staging directory and copy the binary followed by each
    /// document into it, in order.
    ///
    /// # Errors
    ///
    /// Returns the first preparation or copy failure.
    pub fn populate(
        &self,
        binary: &Utf8Path,
        documents: &[Utf8PathBuf],
    ) -> Result<Vec<Utf8PathBuf>> {
        self.prepare()?;
        std::iter::once(binary)
            .chain(documents.iter().map(Utf8PathBuf::as_path))
            .map(|source| self.stage(source))
            .collect()
    }
}

/// Compute the staging directory name: `<tool>-<version>-<platform>`.
///
/// # Examples
///
/// ```
/// use release_publisher::platform::Platform;
/// use release_publisher::stager::staging_dir_name;
/// use release_publisher::tag::Version;
///
/// let version = Version::try_from("2.0.0").expect("valid");
/// let platform = Platform::try_from("linux-x86_64").expect("valid");
/// assert_eq!(
///     staging_dir_name("tool", &version, &platform),
///     "tool-2.0.0-linux-x86_64"
/// );
/// ```
#[must_use]
pub fn staging_dir_name(tool: &str, version: &Version, platform: &Platform) -> String {
    format!("{tool}-{version}-{platform}")
}
