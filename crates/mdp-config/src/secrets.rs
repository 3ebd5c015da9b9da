//! Credential resolution.
//!
//! Secret resolution order:
//! 1. Environment variable named by the profile's `secret-env`
//! 2. `MDP_CLIENT_SECRET`
//! 3. Config file (plaintext)
//!
//! Key resolution order: `MDP_CLIENT_KEY`, then the profile's `key`.

use crate::Profile;

/// Environment variable consulted for the client key.
pub const KEY_ENV: &str = "MDP_CLIENT_KEY";

/// Environment variable consulted for the client secret.
pub const SECRET_ENV: &str = "MDP_CLIENT_SECRET";

/// A resolved credential with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The credential value.
    pub value: String,
    /// Where the credential was found.
    pub source: SecretSource,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Where a credential was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext for secrets).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Resolve the client secret for a profile from the process environment.
pub fn resolve_secret(profile: &Profile) -> Option<ResolvedSecret> {
    resolve_secret_with(profile, |name| std::env::var(name).ok())
}

/// Resolve the client secret using `lookup` in place of the environment.
pub fn resolve_secret_with<F>(profile: &Profile, lookup: F) -> Option<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    let env_vars = profile
        .secret_env
        .as_deref()
        .into_iter()
        .chain(std::iter::once(SECRET_ENV));

    for var in env_vars {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            return Some(ResolvedSecret {
                value,
                source: SecretSource::EnvVar(var.to_string()),
            });
        }
    }

    profile
        .secret
        .clone()
        .filter(|v| !v.is_empty())
        .map(|value| {
            tracing::warn!("Using plaintext client secret from config file");
            ResolvedSecret {
                value,
                source: SecretSource::ConfigFile,
            }
        })
}

/// Resolve the client key for a profile from the process environment.
pub fn resolve_key(profile: &Profile) -> Option<ResolvedSecret> {
    resolve_key_with(profile, |name| std::env::var(name).ok())
}

/// Resolve the client key using `lookup` in place of the environment.
pub fn resolve_key_with<F>(profile: &Profile, lookup: F) -> Option<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(KEY_ENV).filter(|v| !v.is_empty()) {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(KEY_ENV.to_string()),
        });
    }

    profile
        .key
        .clone()
        .filter(|v| !v.is_empty())
        .map(|value| ResolvedSecret {
            value,
            source: SecretSource::ConfigFile,
        })
}
