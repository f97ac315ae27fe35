//! Application configuration.
//!
//! Configuration lives in `config.yaml` under the platform config directory
//! (or wherever `BACKOFFICE_CONFIG` points) and includes:
//! - The admin REST backend address and request timeout
//! - List screen defaults (page size, banner timeout)
//! - Where the local key-value store is kept
//! - The Firebase project holding categories

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{BackofficeError, Result};
use crate::types::{DEFAULT_API_BASE_URL, PageSize};

pub const CONFIG_ENV: &str = "BACKOFFICE_CONFIG";
pub const API_URL_ENV: &str = "BACKOFFICE_API_URL";
pub const FIREBASE_API_KEY_ENV: &str = "BACKOFFICE_FIREBASE_API_KEY";

/// Keys accepted by `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api_base_url",
    "request_timeout",
    "banner_timeout_ms",
    "page_size",
    "storage_path",
    "firebase.project_id",
    "firebase.api_key",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default = "default_banner_timeout_ms")]
    pub banner_timeout_ms: u64,

    #[serde(default)]
    pub page_size: PageSize,

    /// Key-value store file; defaults to `storage.json` in the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "FirebaseConfig::is_default")]
    pub firebase: FirebaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout: default_request_timeout(),
            banner_timeout_ms: default_banner_timeout_ms(),
            page_size: PageSize::default(),
            storage_path: None,
            firebase: FirebaseConfig::default(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_banner_timeout_ms() -> u64 {
    3000
}

/// Firebase project holding the category collection
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub api_key: Option<SecretString>,
}

impl fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl FirebaseConfig {
    pub fn is_default(&self) -> bool {
        self.project_id.is_none() && self.api_key.is_none()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "backoffice", "backoffice").ok_or_else(|| {
        BackofficeError::Config("cannot determine the home directory".to_string())
    })
}

impl Config {
    /// Path of the config file, honoring `BACKOFFICE_CONFIG`.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }
        Ok(project_dirs()?.config_dir().join("config.yaml"))
    }

    /// Load configuration from file, or return the defaults if it does not exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            BackofficeError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Backend address (environment variable takes precedence)
    pub fn api_base_url(&self) -> String {
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            return url;
        }
        self.api_base_url.clone()
    }

    /// Firebase API key (environment variable takes precedence)
    pub fn firebase_api_key(&self) -> Option<SecretString> {
        if let Ok(key) = env::var(FIREBASE_API_KEY_ENV)
            && !key.is_empty()
        {
            return Some(SecretString::from(key));
        }
        self.firebase.api_key.clone()
    }

    pub fn firebase_project_id(&self) -> Option<&str> {
        self.firebase
            .project_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn banner_timeout(&self) -> Duration {
        Duration::from_millis(self.banner_timeout_ms)
    }

    pub fn storage_path(&self) -> Result<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join("storage.json")),
        }
    }

    /// Set one key from its string form, as given to `config set`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "api_base_url" => {
                url::Url::parse(value).map_err(|e| {
                    BackofficeError::Config(format!("invalid URL '{value}': {e}"))
                })?;
                self.api_base_url = value.to_string();
            }
            "request_timeout" => self.request_timeout = parse_positive(key, value)?,
            "banner_timeout_ms" => self.banner_timeout_ms = parse_positive(key, value)?,
            "page_size" => {
                self.page_size = value
                    .parse()
                    .map_err(|e: BackofficeError| BackofficeError::Config(e.to_string()))?;
            }
            "storage_path" => {
                self.storage_path = Some(value)
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from);
            }
            "firebase.project_id" => {
                self.firebase.project_id = Some(value.to_string()).filter(|v| !v.is_empty());
            }
            "firebase.api_key" => {
                self.firebase.api_key =
                    Some(value.to_string()).filter(|v| !v.is_empty()).map(SecretString::from);
            }
            _ => {
                return Err(BackofficeError::Config(format!(
                    "unknown config key '{key}'. Valid keys: {}",
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(BackofficeError::Config(format!(
            "invalid value '{value}' for {key}. Expected a positive integer"
        ))),
    }
}

/// Mask a secret by showing only the first 2 and last 2 characters
pub fn mask_secret(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}
