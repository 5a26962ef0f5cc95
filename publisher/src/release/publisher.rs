//! Create-or-fetch release handling and artefact upload.

use super::api::{Release, ReleaseApi, UploadedAsset};
use crate::content_type::guess_content_type;
use crate::error::{InputError, PublishError, Result};
use crate::tag::ReleaseTag;
use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use std::fs;

/// A file to upload, with the name it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artefact {
    path: Utf8PathBuf,
    name: String,
}

impl Artefact {
    /// Describe the file at `path`, named after its base name.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidArtefactPath`] if `path` has no file
    /// name.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use release_publisher::release::Artefact;
    ///
    /// let artefact = Artefact::new(Utf8PathBuf::from("/work/tool-1.0.0-linux.tar.gz"))
    ///     .expect("named path");
    /// assert_eq!(artefact.name(), "tool-1.0.0-linux.tar.gz");
    /// assert_eq!(artefact.content_type(), "application/gzip");
    /// ```
    pub fn new(path: Utf8PathBuf) -> std::result::Result<Self, InputError> {
        let name = path
            .file_name()
            .ok_or_else(|| InputError::InvalidArtefactPath(path.clone()))?
            .to_owned();
        Ok(Self { path, name })
    }

    /// Return the artefact's location on disk.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Return the published name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the content type inferred from the published name.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        guess_content_type(&self.name)
    }
}

/// Make sure a release exists for `tag` and return it.
///
/// Creation is attempted first. If the store rejects it (typically because
/// the release already exists) the rejection is logged and the release is
/// fetched by tag instead. The fetched record is always the one returned.
///
/// # Errors
///
/// Returns [`PublishError::Release`] if creation fails without a server
/// response or the lookup fails, and [`PublishError::ReleaseNotFound`] if no
/// release exists after the attempt.
pub fn ensure_release(api: &dyn ReleaseApi, tag: &ReleaseTag) -> Result<Release> {
    let tag = tag.as_str();
    info!(":: Creating release {tag}");
    match api.create_release(tag, tag) {
        Ok(_) => {}
        Err(e) if e.is_server_reported() => warn!("could not create release {tag}: {e}"),
        Err(e) => return Err(e.into()),
    }

    api.release_by_tag(tag)?
        .ok_or_else(|| PublishError::ReleaseNotFound {
            tag: tag.to_owned(),
        })
}

/// Upload every artefact to `release`, in order.
///
/// # Errors
///
/// Returns [`PublishError::Io`] if an artefact cannot be read, or
/// [`PublishError::UploadFailed`] for the first rejected upload. Later
/// artefacts are not attempted.
pub fn publish(
    api: &dyn ReleaseApi,
    release: &Release,
    artefacts: &[Artefact],
) -> Result<Vec<UploadedAsset>> {
    artefacts
        .iter()
        .map(|artefact| upload(api, release, artefact))
        .collect()
}

fn upload(api: &dyn ReleaseApi, release: &Release, artefact: &Artefact) -> Result<UploadedAsset> {
    let content_type = artefact.content_type();
    info!(":: Uploading {} ({content_type})", artefact.name());
    let bytes = fs::read(artefact.path())?;
    api.upload_asset(release, content_type, artefact.name(), &bytes)
        .map_err(|source| PublishError::UploadFailed {
            name: artefact.name().to_owned(),
            source,
        })
}
