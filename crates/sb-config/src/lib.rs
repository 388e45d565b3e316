//! ScanBridge Configuration
//!
//! Loads the dispatcher's endpoint settings and the static credential table
//! from a TOML document at startup. The credential table is provisioned
//! externally and read-only for the lifetime of the process; nothing in this
//! workspace adds, removes, or expires entries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Dispatch endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Primary remote endpoint, used when a credential was resolved
    pub primary_url: String,
    /// Local fallback endpoint, used when no credential matches
    pub fallback_url: String,
    /// Application identifier attached to every dispatched call
    pub app_id: String,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            primary_url: "http://localhost:8080".to_string(),
            fallback_url: "http://localhost:3000".to_string(),
            app_id: "scanbridge".to_string(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl EndpointConfig {
    /// Create config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            primary_url: std::env::var("SB_PRIMARY_URL").unwrap_or(defaults.primary_url),
            fallback_url: std::env::var("SB_FALLBACK_URL").unwrap_or(defaults.fallback_url),
            app_id: std::env::var("SB_APP_ID").unwrap_or(defaults.app_id),
            connect_timeout_secs: defaults.connect_timeout_secs,
            request_timeout_secs: defaults.request_timeout_secs,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.primary_url.is_empty() {
            return Err(ConfigError::Invalid("primary_url must not be empty".to_string()));
        }
        if self.fallback_url.is_empty() {
            return Err(ConfigError::Invalid("fallback_url must not be empty".to_string()));
        }
        if self.app_id.is_empty() {
            return Err(ConfigError::Invalid("app_id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Static mapping from request fingerprint to opaque bearer token.
/// Loaded once; no mutation API exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialTable {
    entries: HashMap<String, String>,
}

impl CredentialTable {
    pub fn get(&self, fingerprint: &str) -> Option<&str> {
        self.entries.get(fingerprint).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for CredentialTable {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl FromIterator<(String, String)> for CredentialTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Full toolkit configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolkitConfig {
    #[serde(default)]
    pub endpoints: EndpointConfig,
    /// Missing `[credentials]` table means every call routes to the fallback
    #[serde(default)]
    pub credentials: CredentialTable,
}

impl ToolkitConfig {
    /// Load and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)?;
        config.endpoints.validate()?;
        info!(
            credentials = config.credentials.len(),
            primary = %config.endpoints.primary_url,
            "Loaded toolkit configuration"
        );
        Ok(config)
    }

    /// Environment-only configuration with an empty credential table
    pub fn from_env() -> Self {
        Self {
            endpoints: EndpointConfig::from_env(),
            credentials: CredentialTable::default(),
        }
    }
}
