//! Remote release management.
//!
//! [`api`] defines the release store abstraction and its data types,
//! [`github`] implements it against the GitHub REST API, and [`publisher`]
//! holds the create-or-fetch and upload logic that runs on top of any
//! implementation.

pub mod api;
pub mod github;
pub mod publisher;

pub use api::{Release, ReleaseApi, ReleaseApiError, UploadedAsset};
pub use github::GitHubReleases;
pub use publisher::{Artefact, ensure_release, publish};
