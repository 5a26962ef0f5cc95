//! Release store abstraction.

use serde::Deserialize;
use thiserror::Error;

/// A release record as returned by the release store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Store-assigned identifier.
    pub id: u64,
    /// Tag the release is attached to.
    pub tag_name: String,
    /// Display name, if one was set.
    #[serde(default)]
    pub name: Option<String>,
    /// Upload endpoint, possibly carrying a URI template suffix such as
    /// `{?name,label}`.
    pub upload_url: String,
    /// Browser URL of the release page.
    #[serde(default)]
    pub html_url: Option<String>,
}

impl Release {
    /// Return the upload endpoint with any URI template suffix removed.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseApiError::InvalidUploadUrl`] if nothing precedes the
    /// template.
    ///
    /// # Examples
    ///
    /// ```
    /// use release_publisher::release::Release;
    ///
    /// let release = Release {
    ///     id: 1,
    ///     tag_name: "v1.0.0".to_owned(),
    ///     name: Some("v1.0.0".to_owned()),
    ///     upload_url: "https://uploads.example.test/releases/1/assets{?name,label}".to_owned(),
    ///     html_url: None,
    /// };
    /// assert_eq!(
    ///     release.upload_endpoint().expect("valid endpoint"),
    ///     "https://uploads.example.test/releases/1/assets"
    /// );
    /// ```
    pub fn upload_endpoint(&self) -> Result<&str, ReleaseApiError> {
        let endpoint = self
            .upload_url
            .split_once('{')
            .map_or(self.upload_url.as_str(), |(base, _)| base);
        if endpoint.is_empty() {
            return Err(ReleaseApiError::InvalidUploadUrl(self.upload_url.clone()));
        }
        Ok(endpoint)
    }
}

/// An asset attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedAsset {
    /// Store-assigned identifier.
    pub id: u64,
    /// Asset file name.
    pub name: String,
    /// Content type recorded by the store.
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Direct download URL.
    #[serde(default)]
    pub browser_download_url: Option<String>,
}

/// Errors reported by a [`ReleaseApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReleaseApiError {
    /// A release for the tag already exists.
    #[error("release for tag {tag} already exists")]
    AlreadyExists {
        /// The conflicting tag.
        tag: String,
    },

    /// The store answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        /// HTTP method of the request.
        method: &'static str,
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request never produced a response.
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// HTTP method of the request.
        method: &'static str,
        /// Request URL.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The response body could not be decoded.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse {
        /// Request URL.
        url: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// A release carries an unusable upload URL.
    #[error("invalid upload URL: {0}")]
    InvalidUploadUrl(String),
}

impl ReleaseApiError {
    /// Whether the store itself rejected the request, as opposed to the
    /// request failing to arrive or the answer failing to decode.
    #[must_use]
    pub const fn is_server_reported(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. } | Self::Status { .. })
    }
}

/// Operations against a remote release store.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseApi {
    /// Create a release for `tag` with display name `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ReleaseApiError::AlreadyExists`] when the tag already has a
    /// release, or another [`ReleaseApiError`] on failure.
    fn create_release(&self, tag: &str, name: &str) -> Result<Release, ReleaseApiError>;

    /// Look up the release for `tag`, returning `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns a [`ReleaseApiError`] when the lookup itself fails.
    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>, ReleaseApiError>;

    /// Upload `bytes` to `release` as an asset called `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`ReleaseApiError`] when the upload is rejected or fails.
    fn upload_asset(
        &self,
        release: &Release,
        content_type: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<UploadedAsset, ReleaseApiError>;
}

impl<T: ReleaseApi + ?Sized> ReleaseApi for &T {
    fn create_release(&self, tag: &str, name: &str) -> Result<Release, ReleaseApiError> {
        (**self).create_release(tag, name)
    }

    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>, ReleaseApiError> {
        (**self).release_by_tag(tag)
    }

    fn upload_asset(
        &self,
        release: &Release,
        content_type: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<UploadedAsset, ReleaseApiError> {
        (**self).upload_asset(release, content_type, name, bytes)
    }
}
