//! Project configuration and credentials.
//!
//! Settings come from an optional `publish.toml` in the project root. Any key
//! left out falls back to a value derived from the root `Cargo.toml` (tool
//! name, repository) or to a fixed default.
//!
//! ```toml
//! tool = "ruplacer"
//! repository = "supertanker/ruplacer"
//! documents = ["README.md", "CHANGELOG.md", "LICENSE"]
//! dist_dir = "dist"
//! api_url = "https://api.github.com"
//! token_env = "GITHUB_TOKEN"
//! ```

use crate::error::{PublishError, Result};
use crate::platform::Platform;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the optional configuration file in the project root.
pub const CONFIG_FILE: &str = "publish.toml";

/// Documents copied next to the binary in every staging directory.
pub const DEFAULT_DOCUMENTS: &[&str] = &["README.md", "CHANGELOG.md", "LICENSE"];

const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";
const GITHUB_URL_PREFIX: &str = "https://github.com/";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration or manifest file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration or manifest file is not valid TOML for its schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File that failed to parse.
        path: Utf8PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// Neither `publish.toml` nor `Cargo.toml` names the tool.
    #[error("no tool name: set `tool` in {CONFIG_FILE} or `package.name` in Cargo.toml")]
    MissingToolName,

    /// Publishing needs a repository and none could be determined.
    #[error(
        "no repository: set `repository = \"owner/name\"` in {CONFIG_FILE} \
         or a GitHub `package.repository` URL in Cargo.toml"
    )]
    MissingRepository,

    /// A repository slug is not of the form `owner/name`.
    #[error("invalid repository \"{value}\": expected owner/name")]
    InvalidRepository {
        /// The rejected value.
        value: String,
    },

    /// The distribution directory does not name a subdirectory of the
    /// project root. It is deleted on every run, so anything else is refused.
    #[error("invalid dist_dir \"{value}\": must be a relative path below the project root")]
    InvalidDistDir {
        /// The rejected value.
        value: Utf8PathBuf,
    },

    /// The release API base URL cannot be parsed or cannot carry a path.
    #[error("invalid api_url \"{value}\": {reason}")]
    InvalidApiUrl {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A GitHub repository slug (`owner/name`).
///
/// # Examples
///
/// ```
/// use release_publisher::config::Repository;
///
/// let repo: Repository = "supertanker/ruplacer".parse().expect("valid slug");
/// assert_eq!(repo.owner(), "supertanker");
/// assert_eq!(repo.name(), "ruplacer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Repository {
    owner: String,
    name: String,
}

impl Repository {
    /// Return the repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Return the repository name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Derive a slug from a `https://github.com/owner/name` URL.
    #[must_use]
    pub fn from_github_url(url: &str) -> Option<Self> {
        let path = url.strip_prefix(GITHUB_URL_PREFIX)?.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        path.parse().ok()
    }
}

impl FromStr for Repository {
    type Err = ConfigError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRepository {
            value: value.to_owned(),
        };
        let (owner, name) = value.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }
}

impl TryFrom<String> for Repository {
    type Error = ConfigError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Contents of `publish.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    tool: Option<String>,
    repository: Option<Repository>,
    documents: Option<Vec<Utf8PathBuf>>,
    dist_dir: Option<Utf8PathBuf>,
    api_url: Option<String>,
    token_env: Option<String>,
}

/// The subset of `Cargo.toml` used for defaults.
#[derive(Debug, Default)]
struct ManifestDefaults {
    package_name: Option<String>,
    repository: Option<Repository>,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Project root; all relative paths resolve against it.
    pub root: Utf8PathBuf,
    /// Name of the release binary and prefix of staging directories.
    pub tool: String,
    /// Repository that hosts the releases, if known.
    pub repository: Option<Repository>,
    /// Documents copied into each staging directory, relative to `root`.
    pub documents: Vec<Utf8PathBuf>,
    /// Directory collecting the artefacts of a run, relative to `root`.
    pub dist_dir: Utf8PathBuf,
    /// Base URL of the release API.
    pub api_url: String,
    /// Environment variable holding the API token.
    pub token_env: String,
}

impl PublishConfig {
    /// Build a configuration with default settings for `tool`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use release_publisher::config::PublishConfig;
    ///
    /// let config = PublishConfig::new(Utf8PathBuf::from("/work"), "tool");
    /// assert_eq!(config.dist_path().expect("default is valid"), "/work/dist");
    /// assert_eq!(config.token_env, "GITHUB_TOKEN");
    /// ```
    #[must_use]
    pub fn new(root: Utf8PathBuf, tool: impl Into<String>) -> Self {
        Self {
            root,
            tool: tool.into(),
            repository: None,
            documents: DEFAULT_DOCUMENTS.iter().map(Utf8PathBuf::from).collect(),
            dist_dir: Utf8PathBuf::from(DEFAULT_DIST_DIR),
            api_url: DEFAULT_API_URL.to_owned(),
            token_env: DEFAULT_TOKEN_ENV.to_owned(),
        }
    }

    /// Load configuration for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a present file cannot be read or parsed,
    /// if no tool name can be determined, or if `dist_dir` escapes the
    /// project root.
    pub fn load(root: &Utf8Path) -> std::result::Result<Self, ConfigError> {
        let file = read_config_file(&root.join(CONFIG_FILE))?;
        let manifest = read_manifest_defaults(&root.join("Cargo.toml"))?;

        let tool = file
            .tool
            .or(manifest.package_name)
            .ok_or(ConfigError::MissingToolName)?;
        let mut config = Self::new(root.to_owned(), tool);
        config.repository = file.repository.or(manifest.repository);
        if let Some(documents) = file.documents {
            config.documents = documents;
        }
        if let Some(dist_dir) = file.dist_dir {
            validate_dist_dir(&dist_dir)?;
            config.dist_dir = dist_dir;
        }
        if let Some(api_url) = file.api_url {
            config.api_url = api_url;
        }
        if let Some(token_env) = file.token_env {
            config.token_env = token_env;
        }
        Ok(config)
    }

    /// Return the repository, failing when none was configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRepository`] when unset.
    pub fn require_repository(&self) -> std::result::Result<&Repository, ConfigError> {
        self.repository.as_ref().ok_or(ConfigError::MissingRepository)
    }

    /// Return the path of the release binary for `platform`.
    #[must_use]
    pub fn binary_path(&self, platform: &Platform) -> Utf8PathBuf {
        self.root
            .join("target")
            .join("release")
            .join(format!("{}{}", self.tool, platform.executable_suffix()))
    }

    /// Return the absolute paths of the staged documents.
    #[must_use]
    pub fn document_paths(&self) -> Vec<Utf8PathBuf> {
        self.documents.iter().map(|d| self.root.join(d)).collect()
    }

    /// Return the absolute path of the distribution directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDistDir`] unless `dist_dir` is a
    /// relative path naming a directory strictly below `root`.
    pub fn dist_path(&self) -> std::result::Result<Utf8PathBuf, ConfigError> {
        validate_dist_dir(&self.dist_dir)?;
        Ok(self.root.join(&self.dist_dir))
    }
}

/// An API token read from the environment.
///
/// The token never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Wrap an existing token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from the environment variable `variable`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingCredential`] if the variable is unset,
    /// not valid Unicode, or blank.
    pub fn from_env(variable: &str) -> Result<Self> {
        match std::env::var(variable) {
            Ok(token) if !token.trim().is_empty() => Ok(Self::new(token.trim())),
            _ => Err(PublishError::MissingCredential {
                variable: variable.to_owned(),
            }),
        }
    }

    /// Return the raw token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Accept only relative paths made of plain names, ignoring `.` segments.
fn validate_dist_dir(dist_dir: &Utf8Path) -> std::result::Result<(), ConfigError> {
    let escapes = dist_dir
        .components()
        .any(|c| !matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));
    let names_directory = dist_dir
        .components()
        .any(|c| matches!(c, Utf8Component::Normal(_)));
    if escapes || !names_directory {
        return Err(ConfigError::InvalidDistDir {
            value: dist_dir.to_owned(),
        });
    }
    Ok(())
}

fn read_optional(path: &Utf8Path) -> std::result::Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read {
            path: path.to_owned(),
            source,
        }),
    }
}

fn read_config_file(path: &Utf8Path) -> std::result::Result<ConfigFile, ConfigError> {
    let Some(content) = read_optional(path)? else {
        return Ok(ConfigFile::default());
    };
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

fn read_manifest_defaults(path: &Utf8Path) -> std::result::Result<ManifestDefaults, ConfigError> {
    let Some(content) = read_optional(path)? else {
        return Ok(ManifestDefaults::default());
    };
    let manifest = content
        .parse::<toml::Table>()
        .map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

    let package = manifest.get("package");
    let field = |key: &str| {
        package
            .and_then(|p| p.get(key))
            .and_then(|v| v.as_str())
            .map(str::to_owned)
    };
    Ok(ManifestDefaults {
        package_name: field("name"),
        repository: field("repository")
            .as_deref()
            .and_then(Repository::from_github_url),
    })
}
