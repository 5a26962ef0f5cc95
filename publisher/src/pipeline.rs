//! Release pipeline orchestration.
//!
//! A publish run moves through tag validation, the release build, staging,
//! archiving, optional packaging, and upload. Any failing stage aborts the
//! run. A tag without the release prefix ends the run early and successfully
//! without touching the build, the filesystem, or the network.

use crate::archive::create_archive;
use crate::command::{CommandRunner, run};
use crate::config::PublishConfig;
use crate::error::{InputError, PublishError, Result};
use crate::package::build_package;
use crate::platform::Platform;
use crate::release::{Artefact, Release, ReleaseApi, UploadedAsset, ensure_release, publish};
use crate::stager::Stager;
use crate::tag::{ReleaseTag, Version};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::fs;

/// Shared collaborators for a pipeline run.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a> {
    /// Resolved project configuration.
    pub config: &'a PublishConfig,
    /// Runner for the build and packaging commands.
    pub runner: &'a dyn CommandRunner,
}

/// Raw inputs of a publish run, as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishRequest<'a> {
    /// Tag naming the release, e.g. `v1.2.3`.
    pub tag: &'a str,
    /// Platform label, e.g. `linux-x86_64`.
    pub platform: &'a str,
}

/// How a publish run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tag is not a release tag; nothing was done.
    Skipped {
        /// The tag that was ignored.
        tag: String,
    },
    /// Artefacts were uploaded to the release.
    Published {
        /// The release the artefacts were attached to.
        release: Release,
        /// The uploaded assets, in upload order.
        assets: Vec<UploadedAsset>,
    },
}

/// Run `cargo build --release` in the project root.
///
/// # Errors
///
/// Returns [`PublishError::CommandFailed`] if the build fails.
pub fn build_release(context: &PipelineContext<'_>) -> Result<()> {
    run(context.runner, "cargo", &["build", "--release"])
}

/// Remove `dist` with its contents and create it again, empty.
///
/// # Errors
///
/// Returns [`PublishError::StagingFailed`] if the directory cannot be
/// removed or created.
pub fn recreate_dist(dist: &Utf8Path) -> Result<()> {
    let staging_failed = |source: std::io::Error| PublishError::StagingFailed {
        path: dist.to_owned(),
        source,
    };
    match fs::remove_dir_all(dist) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(staging_failed(e)),
    }
    fs::create_dir_all(dist).map_err(staging_failed)
}

/// Copy each artefact into `dist` under its published name.
///
/// # Errors
///
/// Returns [`PublishError::CopyFailed`] for the first copy that fails.
pub fn collect_into(dist: &Utf8Path, artefacts: &[Artefact]) -> Result<Vec<Utf8PathBuf>> {
    artefacts
        .iter()
        .map(|artefact| {
            let dest = dist.join(artefact.name());
            if dest.as_path() != artefact.path() {
                info!("{} -> {dest}", artefact.path());
                fs::copy(artefact.path(), &dest).map_err(|source| PublishError::CopyFailed {
                    from: artefact.path().to_owned(),
                    to: dest.clone(),
                    source,
                })?;
            }
            Ok(dest)
        })
        .collect()
}

/// Build, stage, archive, and optionally package `version` for `platform`.
///
/// The distribution directory is recreated and receives a copy of every
/// artefact. The returned artefacts point at the original files: the archive
/// next to the staging directory and, on packaging platforms, the package
/// reported by the packaging tool.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidDistDir`](crate::config::ConfigError::InvalidDistDir)
/// before any command runs if the distribution directory is not below the
/// project root, and otherwise the first failure of any stage.
pub fn assemble(
    context: &PipelineContext<'_>,
    version: &Version,
    platform: &Platform,
) -> Result<Vec<Artefact>> {
    let config = context.config;
    let dist = config.dist_path()?;

    build_release(context)?;

    let stager = Stager::new(&config.root, &config.tool, version, platform);
    info!(":: Staging {}", stager.staging_path());
    stager.populate(&config.binary_path(platform), &config.document_paths())?;

    recreate_dist(&dist)?;

    let mut artefacts = vec![Artefact::new(create_archive(
        stager.staging_path(),
        platform.archive_format(),
    )?)?];
    if platform.builds_package() {
        artefacts.push(Artefact::new(build_package(context.runner, &config.root)?)?);
    }

    collect_into(&dist, &artefacts)?;
    Ok(artefacts)
}

/// Run the full publish pipeline.
///
/// `connect` is called once the inputs are validated and before any build
/// step, so a missing credential fails fast. It is never called for a
/// skipped tag.
///
/// # Errors
///
/// Returns [`InputError`] for an invalid version or platform, any error from
/// `connect`, and the first failure of any later stage.
pub fn publish_release<R, F>(
    context: &PipelineContext<'_>,
    request: PublishRequest<'_>,
    connect: F,
) -> Result<Outcome>
where
    R: ReleaseApi,
    F: FnOnce() -> Result<R>,
{
    let tag = match ReleaseTag::try_from(request.tag) {
        Ok(tag) => tag,
        Err(InputError::NotPublishable { tag, .. }) => {
            info!("{tag} is not a release tag, skipping");
            return Ok(Outcome::Skipped { tag });
        }
        Err(e) => return Err(e.into()),
    };
    let platform = Platform::try_from(request.platform)?;
    let api = connect()?;

    info!(":: Publishing {tag} for {platform}");
    let artefacts = assemble(context, tag.version(), &platform)?;
    let release = ensure_release(&api, &tag)?;
    let assets = publish(&api, &release, &artefacts)?;
    Ok(Outcome::Published { release, assets })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
