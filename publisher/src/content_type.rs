//! MIME type lookup for uploaded release assets.
//!
//! Matching is on the file name suffix, case-insensitively, with compound
//! suffixes such as `.tar.gz` checked before their final component.

/// Content type used when no suffix matches.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Known suffixes, longest first where one is a suffix of another.
const SUFFIXES: &[(&str, &str)] = &[
    (".tar.gz", "application/gzip"),
    (".tar.xz", "application/x-xz"),
    (".tar.zst", "application/zstd"),
    (".tgz", "application/gzip"),
    (".gz", "application/gzip"),
    (".xz", "application/x-xz"),
    (".zst", "application/zstd"),
    (".zip", "application/zip"),
    (".tar", "application/x-tar"),
    (".deb", "application/vnd.debian.binary-package"),
    (".rpm", "application/x-rpm"),
    (".exe", "application/vnd.microsoft.portable-executable"),
    (".msi", "application/x-msi"),
    (".dmg", "application/x-apple-diskimage"),
    (".json", "application/json"),
    (".txt", "text/plain"),
    (".md", "text/markdown"),
    (".sha256", "text/plain"),
];

/// Guess the content type for an asset named `name`.
///
/// # Examples
///
/// ```
/// use release_publisher::content_type::guess_content_type;
///
/// assert_eq!(guess_content_type("tool-1.0.0-linux.tar.gz"), "application/gzip");
/// assert_eq!(guess_content_type("tool-1.0.0-windows.ZIP"), "application/zip");
/// assert_eq!(guess_content_type("tool"), "application/octet-stream");
/// ```
#[must_use]
pub fn guess_content_type(name: &str) -> &'static str {
    let lowered = name.to_ascii_lowercase();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| lowered.ends_with(suffix))
        .map_or(FALLBACK_CONTENT_TYPE, |&(_, content_type)| content_type)
}
