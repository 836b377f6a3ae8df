//! Client configuration with YAML support

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DataPlatformError, Result};

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "DATA_PLATFORM_TOKEN";
/// Environment variable overriding the API host
pub const HOST_ENV: &str = "DATA_PLATFORM_HOST";

/// Data platform client configuration
///
/// Can be loaded from YAML, JSON, the environment, or constructed
/// programmatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API token sent as a bearer credential
    pub token: String,

    /// API host name (default: api.foxglove.dev)
    #[serde(default = "default_host")]
    pub host: String,

    /// Full scheme + authority override, e.g. `http://127.0.0.1:8080`
    ///
    /// Takes precedence over `host`, which is always reached over HTTPS.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

fn default_host() -> String {
    "api.foxglove.dev".to_string()
}

/// Timeout configuration
///
/// Absent values impose no limit of the client's own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Whole-request timeout in milliseconds
    #[serde(default)]
    pub request_ms: Option<u64>,

    /// Connect timeout in milliseconds
    #[serde(default)]
    pub connect_ms: Option<u64>,
}

impl TimeoutsConfig {
    pub fn request(&self) -> Option<Duration> {
        self.request_ms.map(Duration::from_millis)
    }

    pub fn connect(&self) -> Option<Duration> {
        self.connect_ms.map(Duration::from_millis)
    }
}

impl ClientConfig {
    /// Configuration for the default host
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            host: default_host(),
            base_url: None,
            timeouts: TimeoutsConfig::default(),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DataPlatformError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| DataPlatformError::Config(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DataPlatformError::Config(e.to_string()))
    }

    /// Read `DATA_PLATFORM_TOKEN` and, if set, `DATA_PLATFORM_HOST`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup(TOKEN_ENV)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| DataPlatformError::Config(format!("{} is not set", TOKEN_ENV)))?;
        let mut config = Self::new(token);
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.is_empty()) {
            config.host = host;
        }
        Ok(config)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| DataPlatformError::Config(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder(token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(token)
    }

    /// Scheme and authority every endpoint path is joined to
    pub fn api_base(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}", self.host),
        }
    }
}

/// Builder for ClientConfig
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(token),
        }
    }

    /// Set the API host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set a full base URL, overriding the host
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout in milliseconds
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = Some(ms);
        self
    }

    /// Set the connect timeout in milliseconds
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.connect_ms = Some(ms);
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
