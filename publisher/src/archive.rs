//! Release archive creation.
//!
//! Compresses a staging directory into `<staging_dir>.zip` or
//! `<staging_dir>.tar.gz`. The staging directory itself is the single
//! top-level member, so extracting the archive recreates
//! `<tool>-<version>-<platform>/` with its contents. Members are written in
//! sorted path order and tar headers are normalised, so repeated runs over
//! the same tree list identical members.

use crate::platform::ArchiveFormat;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use log::info;
use std::fs;
use std::io;
use thiserror::Error;
use zip::write::SimpleFileOptions;

/// Errors arising while writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An I/O operation failed (walking the tree, reading a member, writing
    /// the archive).
    #[error("I/O error during archiving: {0}")]
    Io(#[from] io::Error),

    /// The zip writer rejected an entry.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The staging path has no final component to name the archive after.
    #[error("staging path has no directory name: {0}")]
    InvalidStagingPath(Utf8PathBuf),

    /// A path inside the staging directory is not valid UTF-8.
    #[error("non UTF-8 path in staging directory: {0}")]
    NonUtf8Path(std::path::PathBuf),
}

/// One member of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    /// Location on disk.
    source: Utf8PathBuf,
    /// Name inside the archive, `/`-separated.
    name: String,
    is_dir: bool,
}

/// Return the path of the archive for `staging_dir` in `format`.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use release_publisher::archive::archive_path;
/// use release_publisher::platform::ArchiveFormat;
///
/// let path = archive_path(Utf8Path::new("tool-1.0.0-linux"), ArchiveFormat::TarGz);
/// assert_eq!(path.as_str(), "tool-1.0.0-linux.tar.gz");
/// ```
#[must_use]
pub fn archive_path(staging_dir: &Utf8Path, format: ArchiveFormat) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{staging_dir}.{}", format.extension()))
}

/// Compress `staging_dir` into a sibling archive and return its path.
///
/// An existing archive at the destination is overwritten.
///
/// # Errors
///
/// Returns [`ArchiveError`] if the tree cannot be walked, a member cannot be
/// read, or the archive cannot be written.
pub fn create_archive(
    staging_dir: &Utf8Path,
    format: ArchiveFormat,
) -> Result<Utf8PathBuf, ArchiveError> {
    let base = staging_dir
        .file_name()
        .ok_or_else(|| ArchiveError::InvalidStagingPath(staging_dir.to_owned()))?;
    let members = collect_members(staging_dir, base)?;
    let output = archive_path(staging_dir, format);

    match format {
        ArchiveFormat::TarGz => write_tar_gz(&output, &members)?,
        ArchiveFormat::Zip => write_zip(&output, &members)?,
    }

    info!(":: generated {output}");
    Ok(output)
}

/// Walk `root` depth-first in sorted order, naming members under `base`.
fn collect_members(root: &Utf8Path, base: &str) -> Result<Vec<Member>, ArchiveError> {
    let mut members = vec![Member {
        source: root.to_owned(),
        name: base.to_owned(),
        is_dir: true,
    }];
    walk(root, base, &mut members)?;
    Ok(members)
}

fn walk(dir: &Utf8Path, prefix: &str, members: &mut Vec<Member>) -> Result<(), ArchiveError> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| {
            let path = entry?.path();
            Utf8PathBuf::try_from(path).map_err(|e| ArchiveError::NonUtf8Path(e.into_path_buf()))
        })
        .collect::<Result<Vec<_>, ArchiveError>>()?;
    children.sort();

    for source in children {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let name = format!("{prefix}/{file_name}");
        let is_dir = source.is_dir();
        members.push(Member {
            source: source.clone(),
            name: name.clone(),
            is_dir,
        });
        if is_dir {
            walk(&source, &name, members)?;
        }
    }
    Ok(())
}

fn write_tar_gz(output: &Utf8Path, members: &[Member]) -> Result<(), ArchiveError> {
    let file = fs::File::create(output)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut archive = tar::Builder::new(encoder);
    archive.mode(tar::HeaderMode::Deterministic);

    for member in members {
        if member.is_dir {
            archive.append_dir(&member.name, &member.source)?;
        } else {
            archive.append_path_with_name(&member.source, &member.name)?;
        }
    }

    archive.into_inner()?.finish()?;
    Ok(())
}

fn write_zip(output: &Utf8Path, members: &[Member]) -> Result<(), ArchiveError> {
    let file = fs::File::create(output)?;
    let mut archive = zip::ZipWriter::new(file);

    for member in members {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(unix_mode(&member.source)?);
        if member.is_dir {
            archive.add_directory(format!("{}/", member.name), options)?;
        } else {
            archive.start_file(member.name.clone(), options)?;
            let mut source = fs::File::open(&member.source)?;
            io::copy(&mut source, &mut archive)?;
        }
    }

    archive.finish()?;
    Ok(())
}

#[cfg(unix)]
fn unix_mode(path: &Utf8Path) -> io::Result<u32> {
    use std::os::unix::fs::PermissionsExt;

    Ok(fs::metadata(path)?.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn unix_mode(path: &Utf8Path) -> io::Result<u32> {
    Ok(if fs::metadata(path)?.is_dir() {
        0o755
    } else {
        0o644
    })
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
