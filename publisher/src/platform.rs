//! Platform identifiers and the decisions derived from them.
//!
//! The platform label supplied on the command line is free-form. Three facts
//! are resolved from it once, at construction: the executable suffix, the
//! archive format, and whether an OS package is built.

use crate::error::InputError;
use std::fmt;

/// Substring marking a Windows-family platform.
const WINDOWS_MARKER: &str = "windows";

/// Substring marking a platform whose releases also ship a Debian package.
const PACKAGING_MARKER: &str = "linux";

/// Compression format used for a release archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// A zip file, used for Windows releases.
    Zip,
    /// A gzip-compressed tarball, used everywhere else.
    TarGz,
}

impl ArchiveFormat {
    /// Return the file extension for this format, without a leading dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use release_publisher::platform::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::Zip.extension(), "zip");
    /// assert_eq!(ArchiveFormat::TarGz.extension(), "tar.gz");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A validated platform label with its derived release properties.
///
/// # Examples
///
/// ```
/// use release_publisher::platform::{ArchiveFormat, Platform};
///
/// let linux = Platform::try_from("linux-x86_64").expect("valid platform");
/// assert_eq!(linux.executable_suffix(), "");
/// assert_eq!(linux.archive_format(), ArchiveFormat::TarGz);
/// assert!(linux.builds_package());
///
/// let windows = Platform::try_from("windows").expect("valid platform");
/// assert_eq!(windows.executable_suffix(), ".exe");
/// assert_eq!(windows.archive_format(), ArchiveFormat::Zip);
/// assert!(!windows.builds_package());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    name: String,
    executable_suffix: &'static str,
    archive_format: ArchiveFormat,
    builds_package: bool,
}

impl Platform {
    /// Return the platform label as supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Return the suffix appended to the release binary's file name.
    #[must_use]
    pub const fn executable_suffix(&self) -> &'static str {
        self.executable_suffix
    }

    /// Return the archive format for this platform.
    #[must_use]
    pub const fn archive_format(&self) -> ArchiveFormat {
        self.archive_format
    }

    /// Whether releases for this platform include an OS package.
    #[must_use]
    pub const fn builds_package(&self) -> bool {
        self.builds_package
    }
}

impl TryFrom<&str> for Platform {
    type Error = InputError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let reason = if value.is_empty() {
            Some("platform must not be empty")
        } else if value.contains(['/', '\\']) {
            Some("platform must not contain path separators")
        } else if value.chars().any(char::is_whitespace) {
            Some("platform must not contain whitespace")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(InputError::InvalidPlatform {
                value: value.to_owned(),
                reason: reason.to_owned(),
            });
        }

        let is_windows = value.contains(WINDOWS_MARKER);
        Ok(Self {
            name: value.to_owned(),
            executable_suffix: if is_windows { ".exe" } else { "" },
            archive_format: if is_windows {
                ArchiveFormat::Zip
            } else {
                ArchiveFormat::TarGz
            },
            builds_package: value.contains(PACKAGING_MARKER),
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
