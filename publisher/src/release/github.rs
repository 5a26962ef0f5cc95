//! GitHub Releases implementation of [`ReleaseApi`] over `ureq`.

use super::api::{Release, ReleaseApi, ReleaseApiError, UploadedAsset};
use crate::config::{ConfigError, Credentials, PublishConfig, Repository};
use log::{debug, trace};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Per-request timeout; uploads of large archives must fit inside it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("release-publisher/", env!("CARGO_PKG_VERSION"));

/// Body of a create-release request.
#[derive(Debug, Serialize)]
struct CreateRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
}

/// Client for the releases of one GitHub repository.
///
/// Owns its HTTP agent and credentials; construct one per run.
pub struct GitHubReleases {
    agent: ureq::Agent,
    releases: Url,
    credentials: Credentials,
}

impl std::fmt::Debug for GitHubReleases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubReleases")
            .field("releases", &self.releases.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl GitHubReleases {
    /// Create a client for the repository named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRepository`] if the configuration names
    /// no repository, or [`ConfigError::InvalidApiUrl`] if the API base URL
    /// is unusable.
    pub fn new(config: &PublishConfig, credentials: Credentials) -> Result<Self, ConfigError> {
        let repository = config.require_repository()?;
        let releases = releases_endpoint(&config.api_url, repository)?;
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build();
        Ok(Self {
            agent: ureq::Agent::new_with_config(agent_config),
            releases,
            credentials,
        })
    }

    fn releases_url(&self) -> String {
        self.releases.as_str().to_owned()
    }

    /// The tag is percent-encoded as a single path segment.
    fn tag_url(&self, tag: &str) -> String {
        let mut url = self.releases.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("tags").push(tag);
        }
        url.into()
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.credentials.token())
    }
}

impl ReleaseApi for GitHubReleases {
    fn create_release(&self, tag: &str, name: &str) -> Result<Release, ReleaseApiError> {
        let url = self.releases_url();
        let body = serde_json::to_vec(&CreateRelease {
            tag_name: tag,
            name,
        })
        .map_err(|e| ReleaseApiError::InvalidResponse {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        debug!("POST {url}");
        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization())
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .send(&body[..])
            .map_err(|e| match e {
                ureq::Error::StatusCode(422) => ReleaseApiError::AlreadyExists {
                    tag: tag.to_owned(),
                },
                other => map_ureq_error("POST", &url, other),
            })?;
        read_json(&url, response)
    }

    fn release_by_tag(&self, tag: &str) -> Result<Option<Release>, ReleaseApiError> {
        let url = self.tag_url(tag);
        debug!("GET {url}");
        let result = self
            .agent
            .get(&url)
            .header("Authorization", &self.authorization())
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .call();
        match result {
            Ok(response) => read_json(&url, response).map(Some),
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(map_ureq_error("GET", &url, e)),
        }
    }

    fn upload_asset(
        &self,
        release: &Release,
        content_type: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<UploadedAsset, ReleaseApiError> {
        let url = release.upload_endpoint()?.to_owned();
        debug!("POST {url}?name={name} ({} bytes, {content_type})", bytes.len());
        let response = self
            .agent
            .post(&url)
            .query("name", name)
            .header("Authorization", &self.authorization())
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", content_type)
            .send(bytes)
            .map_err(|e| map_ureq_error("POST", &url, e))?;
        read_json(&url, response)
    }
}

/// Build `<api_url>/repos/<owner>/<name>/releases`.
fn releases_endpoint(api_url: &str, repository: &Repository) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidApiUrl {
        value: api_url.to_owned(),
        reason,
    };
    let mut url = Url::parse(api_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot carry a path".to_owned()))?
        .pop_if_empty()
        .extend(["repos", repository.owner(), repository.name(), "releases"]);
    Ok(url)
}

fn read_json<T: DeserializeOwned>(
    url: &str,
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, ReleaseApiError> {
    let text = response
        .into_body()
        .read_to_string()
        .map_err(|e| ReleaseApiError::InvalidResponse {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
    trace!("response from {url}: {text}");
    serde_json::from_str(&text).map_err(|e| ReleaseApiError::InvalidResponse {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Map a ureq error to a [`ReleaseApiError`].
fn map_ureq_error(method: &'static str, url: &str, err: ureq::Error) -> ReleaseApiError {
    match err {
        ureq::Error::StatusCode(status) => ReleaseApiError::Status {
            method,
            url: url.to_owned(),
            status,
        },
        other => ReleaseApiError::Transport {
            method,
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    fn client(api_url: &str) -> GitHubReleases {
        let mut config = PublishConfig::new(Utf8PathBuf::from("/work"), "ruplacer");
        config.repository = Some("supertanker/ruplacer".parse().expect("valid slug"));
        config.api_url = api_url.to_owned();
        GitHubReleases::new(&config, Credentials::new("secret")).expect("client builds")
    }

    #[test]
    fn releases_url_names_repository() {
        assert_eq!(
            client("https://api.github.com").releases_url(),
            "https://api.github.com/repos/supertanker/ruplacer/releases"
        );
    }

    #[test]
    fn trailing_slash_on_api_url_is_ignored() {
        assert_eq!(
            client("https://ghe.example.test/api/v3/").tag_url("v1.0.0"),
            "https://ghe.example.test/api/v3/repos/supertanker/ruplacer/releases/tags/v1.0.0"
        );
    }

    #[test]
    fn reserved_characters_in_tag_are_escaped() {
        assert_eq!(
            client("https://api.github.com").tag_url("v1.0#rc?x"),
            "https://api.github.com/repos/supertanker/ruplacer/releases/tags/v1.0%23rc%3Fx"
        );
    }

    #[test]
    fn slash_in_tag_stays_in_one_segment() {
        assert_eq!(
            client("https://api.github.com").tag_url("release/v1"),
            "https://api.github.com/repos/supertanker/ruplacer/releases/tags/release%2Fv1"
        );
    }

    #[rstest]
    #[case::not_a_url("api.github.com")]
    #[case::no_path("mailto:releases@example.test")]
    fn unusable_api_url_is_a_config_error(#[case] api_url: &str) {
        let mut config = PublishConfig::new(Utf8PathBuf::from("/work"), "ruplacer");
        config.repository = Some("supertanker/ruplacer".parse().expect("valid slug"));
        config.api_url = api_url.to_owned();
        let err = GitHubReleases::new(&config, Credentials::new("secret"))
            .expect_err("api_url must be usable");
        assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
    }

    #[test]
    fn missing_repository_is_a_config_error() {
        let config = PublishConfig::new(Utf8PathBuf::from("/work"), "ruplacer");
        let err = GitHubReleases::new(&config, Credentials::new("secret"))
            .expect_err("repository is required");
        assert!(matches!(err, ConfigError::MissingRepository));
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", client("https://api.github.com"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn status_errors_keep_their_code() {
        let mapped = map_ureq_error("GET", "https://x.test", ureq::Error::StatusCode(500));
        assert_eq!(
            mapped,
            ReleaseApiError::Status {
                method: "GET",
                url: "https://x.test".to_owned(),
                status: 500,
            }
        );
    }

    #[test]
    fn other_errors_are_transport_failures() {
        let mapped = map_ureq_error("POST", "https://x.test", ureq::Error::ConnectionFailed);
        assert!(matches!(mapped, ReleaseApiError::Transport { method: "POST", .. }));
        assert!(!mapped.is_server_reported());
    }
}
