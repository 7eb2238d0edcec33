//! Upload configuration
//!
//! Deserializes the uploader's YAML configuration and resolves store
//! credentials, falling back to environment variables and then to a
//! user-home credentials file so site sources can be published without
//! embedding secrets.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User-home fallback file holding `username` / `api_key` keys.
pub const CREDENTIALS_FILENAME: &str = ".site-asset-uploader";

const USERNAME_ENV_VAR: &str = "SITE_ASSET_USERNAME";
const API_KEY_ENV_VAR: &str = "SITE_ASSET_API_KEY";

/// Datacentre the target account lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datacentre {
    #[default]
    Us,
    Uk,
}

impl Datacentre {
    /// Storage API endpoint for the datacentre.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Datacentre::Us => "https://nyc3.digitaloceanspaces.com",
            Datacentre::Uk => "https://lon1.digitaloceanspaces.com",
        }
    }

    /// Region slug used in delivery hostnames.
    pub fn region(&self) -> &'static str {
        match self {
            Datacentre::Us => "nyc3",
            Datacentre::Uk => "lon1",
        }
    }
}

/// Resolved store credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    username: Option<String>,
    api_key: Option<String>,
}

/// Uploader configuration, typically loaded from `uploader.yml`.
///
/// Unknown keys are rejected at load time: a misspelled option (say
/// `force_uplod`) fails the run instead of silently uploading nothing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Master switch; when false the uploader passes references through
    /// unchanged and never touches the store.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub datacentre: Datacentre,
    /// Destination container; created (and published to the CDN) if absent.
    #[serde(default)]
    pub container: String,
    /// Optional canonical URL prefix used in place of the container's
    /// delivery URL. Used exactly as configured, including any trailing slash.
    #[serde(default)]
    pub cname: Option<String>,
    /// Prefix prepended to every generated object name.
    #[serde(default)]
    pub upload_prefix: String,
    /// Upload (and edge-purge) even when the object already exists remotely.
    #[serde(default)]
    pub force_upload: bool,
    /// Optional cross-run manifest of objects known to exist remotely.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    /// Optional CDN API token for edge purges; without it purges are skipped.
    #[serde(default)]
    pub purge_token: Option<String>,
    /// CDN endpoint ID the purge API addresses.
    #[serde(default)]
    pub purge_endpoint_id: Option<String>,
}

impl Config {
    /// Load and validate configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that hold whenever uploading is enabled.
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.container.trim().is_empty() {
            return Err(Error::Configuration(
                "You must specify a destination container".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve credentials from config, environment, then the user-home
    /// fallback file.
    pub fn resolve_credentials(&self) -> Result<Credentials> {
        dotenvy::dotenv().ok();
        self.resolve_credentials_from(dirs::home_dir().map(|h| h.join(CREDENTIALS_FILENAME)))
    }

    fn resolve_credentials_from(&self, fallback_file: Option<PathBuf>) -> Result<Credentials> {
        let mut username = self
            .username
            .clone()
            .or_else(|| std::env::var(USERNAME_ENV_VAR).ok());
        let mut api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV_VAR).ok());

        if username.is_none() || api_key.is_none() {
            if let Some(file) = fallback_file.filter(|f| f.exists()) {
                let from_file = Self::read_credentials_file(&file)?;
                username = username.or(from_file.username);
                api_key = api_key.or(from_file.api_key);
            }
        }

        match (username, api_key) {
            (Some(username), Some(api_key)) => Ok(Credentials { username, api_key }),
            _ => Err(Error::Configuration(format!(
                "You must provide your store username and api_key (in the config file, \
                 via {}/{}, or in ~/{})",
                USERNAME_ENV_VAR, API_KEY_ENV_VAR, CREDENTIALS_FILENAME
            ))),
        }
    }

    fn read_credentials_file(path: &Path) -> Result<CredentialsFile> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "Cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            Error::Configuration(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }
}
