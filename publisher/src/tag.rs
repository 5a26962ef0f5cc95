//! Release tag and version newtypes.
//!
//! Only tags that begin with [`RELEASE_TAG_PREFIX`] are published. The
//! version is the tag with that single prefix character removed, and is
//! embedded in staging directory and archive names.

use crate::error::InputError;
use std::fmt;

/// Prefix marking a tag as a publishable release.
pub const RELEASE_TAG_PREFIX: char = 'v';

/// A validated version string (e.g. `1.2.3`).
///
/// # Examples
///
/// ```
/// use release_publisher::tag::Version;
///
/// let version: Version = "1.2.3".try_into().expect("valid version");
/// assert_eq!(version.as_str(), "1.2.3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

/// Versions end up in directory names, so path separators are refused.
fn is_valid_version_char(c: char) -> bool {
    !c.is_whitespace() && !c.is_control() && c != '/' && c != '\\'
}

impl Version {
    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Version {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InputError::InvalidVersion {
                value: value.to_owned(),
                reason: "version must not be empty".to_owned(),
            });
        }
        if let Some(bad) = value.chars().find(|c| !is_valid_version_char(*c)) {
            return Err(InputError::InvalidVersion {
                value: value.to_owned(),
                reason: format!("invalid character {bad:?}"),
            });
        }
        Ok(Self(value.to_owned()))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A publishable release tag such as `v1.2.3`.
///
/// # Examples
///
/// ```
/// use release_publisher::tag::ReleaseTag;
///
/// let tag = ReleaseTag::try_from("v1.2.3").expect("publishable tag");
/// assert_eq!(tag.as_str(), "v1.2.3");
/// assert_eq!(tag.version().as_str(), "1.2.3");
///
/// assert!(ReleaseTag::try_from("nightly").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseTag {
    tag: String,
    version: Version,
}

impl ReleaseTag {
    /// Return the full tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.tag
    }

    /// Return the version carried by the tag.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl TryFrom<&str> for ReleaseTag {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let Some(version) = value.strip_prefix(RELEASE_TAG_PREFIX) else {
            return Err(InputError::NotPublishable {
                tag: value.to_owned(),
                prefix: RELEASE_TAG_PREFIX,
            });
        };
        Ok(Self {
            tag: value.to_owned(),
            version: Version::try_from(version)?,
        })
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}
