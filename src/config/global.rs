//! Global configuration and service credentials
//!
//! Stored at `~/.nimbus/config.toml`. Credentials never live in the
//! project file; the `GITHUB_TOKEN` environment variable takes
//! precedence over anything stored on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::paths;

/// Environment variable that overrides the stored github token
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Global nimbus configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Service credentials, keyed by service name
    #[serde(default)]
    pub services: BTreeMap<String, ServiceConfig>,
}

/// Credentials for one external service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Account username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ServiceConfig {
    /// Names of the attributes that are set, for display.
    #[must_use]
    pub fn configured_attributes(&self) -> Vec<String> {
        let mut attrs = Vec::new();
        if self.username.is_some() {
            attrs.push("username".to_string());
        }
        if self.token.is_some() {
            attrs.push("token".to_string());
        }
        if self.email.is_some() {
            attrs.push("email".to_string());
        }
        attrs
    }
}

/// Where a token was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// From the process environment
    Environment,
    /// From `~/.nimbus/config.toml`
    GlobalConfig,
}

impl TokenSource {
    /// Human-readable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::GlobalConfig => "global config",
        }
    }
}

impl GlobalConfig {
    /// Get the config file path
    #[must_use]
    pub fn config_path() -> PathBuf {
        paths::global_config()
    }

    /// Load config from disk, or create default if not exists
    #[must_use]
    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            fs::read_to_string(&path)
                .ok()
                .and_then(|content| toml::from_str(&content).ok())
                .unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Save config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = paths::global_config_dir();
        fs::create_dir_all(&dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(Self::config_path(), content)?;
        Ok(())
    }

    /// Get a service's stored credentials
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.get(name)
    }

    /// Store credentials for a service, merging with any existing entry
    pub fn set_service(&mut self, name: &str, update: ServiceConfig) {
        let entry = self.services.entry(name.to_string()).or_default();
        if update.username.is_some() {
            entry.username = update.username;
        }
        if update.token.is_some() {
            entry.token = update.token;
        }
        if update.email.is_some() {
            entry.email = update.email;
        }
    }
}

/// Credential resolution across the environment and the global config
#[derive(Debug, Clone, Default)]
pub struct Keychain {
    global: GlobalConfig,
}

impl Keychain {
    /// Load the keychain from the global config
    #[must_use]
    pub fn load() -> Self {
        Self { global: GlobalConfig::load() }
    }

    /// Build a keychain from an already-loaded global config
    #[must_use]
    pub const fn from_global(global: GlobalConfig) -> Self {
        Self { global }
    }

    /// All stored services
    #[must_use]
    pub const fn services(&self) -> &BTreeMap<String, ServiceConfig> {
        &self.global.services
    }

    /// Get a service's credentials
    pub fn service(&self, name: &str) -> Result<&ServiceConfig, ConfigError> {
        self.global
            .service(name)
            .ok_or_else(|| ConfigError::ServiceNotConfigured(name.to_string()))
    }

    /// Resolve the github token.
    ///
    /// `GITHUB_TOKEN` in the environment wins over the stored service.
    pub fn github_token(&self) -> Result<(String, TokenSource), ConfigError> {
        if let Ok(token) = std::env::var(GITHUB_TOKEN_ENV)
            && !token.trim().is_empty()
        {
            return Ok((token, TokenSource::Environment));
        }
        self.global
            .service("github")
            .and_then(|s| s.token.clone())
            .map(|t| (t, TokenSource::GlobalConfig))
            .ok_or_else(|| ConfigError::ServiceNotConfigured("github".to_string()))
    }
}
