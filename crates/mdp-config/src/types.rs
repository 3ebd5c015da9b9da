//! Configuration types.
//!
//! ```toml
//! default-profile = "sandbox"
//!
//! [profiles.sandbox]
//! version = "preview1"
//! key = "client-key"
//! secret-env = "MDP_SANDBOX_SECRET"
//! practice-id = "195900"
//!
//! [profiles.prod]
//! version = "v1"
//! environment = "prod"
//! timeout = 60
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Profile used when none is named on the command line.
    #[serde(default)]
    pub default_profile: Option<String>,

    /// Named connection profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ClientConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        for (name, profile) in &config.profiles {
            if profile.version.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "version".to_string(),
                    context: format!("profile '{}'", name),
                });
            }
        }
        Ok(config)
    }

    /// Get a profile by name.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// List all profile names.
    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Select a profile: the named one, else `default-profile`, else the
    /// only profile if exactly one is configured.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &Profile)> {
        let name = match name.or(self.default_profile.as_deref()) {
            Some(name) => name,
            None if self.profiles.len() == 1 => self
                .profiles
                .keys()
                .next()
                .map(String::as_str)
                .ok_or(ConfigError::NoProfile)?,
            None => return Err(ConfigError::NoProfile),
        };

        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }
}

/// A named connection profile (credentials + endpoint bundle).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    /// API version identifier (`v1`, `preview1`, `openpreview1`).
    pub version: String,

    /// Client key (also known as client ID).
    #[serde(default)]
    pub key: Option<String>,

    /// Client secret in plaintext. Prefer `secret-env`.
    #[serde(default)]
    pub secret: Option<String>,

    /// Environment variable holding the client secret.
    #[serde(default)]
    pub secret_env: Option<String>,

    /// Practice ID to scope requests to.
    #[serde(default)]
    pub practice_id: Option<String>,

    /// Platform environment preset (`prod` or `preview`).
    #[serde(default)]
    pub environment: Option<String>,

    /// API host override.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Token endpoint path override.
    #[serde(default)]
    pub auth_path: Option<String>,

    /// Scope requested with the client-credentials grant.
    #[serde(default)]
    pub scope: Option<String>,

    /// Request timeout (seconds).
    #[serde(default)]
    pub timeout: Option<u64>,
}
