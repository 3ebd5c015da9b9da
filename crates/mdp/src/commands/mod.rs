//! CLI command handlers.

pub mod profiles;
pub mod request;
pub mod token;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use mdp_client::{ApiVersion, Connection, Environment};
use mdp_config::{KEY_ENV, SECRET_ENV, resolve_key, resolve_secret};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, if given.
    pub config_path: Option<PathBuf>,
    /// Profile name, if given.
    pub profile: Option<String>,
    /// Practice ID override.
    pub practice: Option<String>,
    /// Print JSON on a single line.
    pub compact: bool,
}

impl Context {
    /// Load the selected profile and open an authenticated connection.
    pub async fn connect(&self) -> Result<Connection> {
        let loaded = mdp_config::load_config(self.config_path.as_deref())?;
        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }

        let (name, profile) = loaded.config.select(self.profile.as_deref())?;
        let version: ApiVersion = profile
            .version
            .parse()
            .with_context(|| format!("invalid version in profile '{}'", name))?;

        let key = resolve_key(profile).ok_or_else(|| {
            anyhow!("no client key for profile '{}' (set key or {})", name, KEY_ENV)
        })?;
        let secret = resolve_secret(profile).ok_or_else(|| {
            anyhow!(
                "no client secret for profile '{}' (set secret-env or {})",
                name,
                SECRET_ENV
            )
        })?;
        tracing::debug!(
            profile = name,
            key_source = %key.source,
            secret_source = %secret.source,
            "Resolved credentials"
        );

        let mut builder = Connection::builder()
            .version(version)
            .credentials(key.value, secret.value);
        if let Some(environment) = &profile.environment {
            let environment: Environment = environment
                .parse()
                .with_context(|| format!("invalid environment in profile '{}'", name))?;
            builder = builder.environment(environment);
        }
        if let Some(url) = &profile.base_url {
            builder = builder.base_url(url.as_str());
        }
        if let Some(path) = &profile.auth_path {
            builder = builder.auth_path(path.as_str());
        }
        if let Some(scope) = &profile.scope {
            builder = builder.scope(scope.as_str());
        }
        if let Some(secs) = profile.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(practice) = self.practice.as_ref().or(profile.practice_id.as_ref()) {
            builder = builder.practice_id(practice.as_str());
        }

        builder
            .connect()
            .await
            .with_context(|| format!("failed to authenticate with profile '{}'", name))
    }

    /// Print a JSON value to stdout.
    pub fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let text = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        println!("{}", text);
        Ok(())
    }
}
