//! Config file discovery.
//!
//! Resolution order (first match wins):
//! 1. An explicit path (e.g. `--config`)
//! 2. `MDP_CONFIG` environment variable
//! 3. `<user config dir>/mdp/config.toml`
//!
//! Explicit and env-var paths must exist. A missing file in the user config
//! dir yields an empty config.

use std::path::{Path, PathBuf};

use crate::{ClientConfig, ConfigError, Result};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "MDP_CONFIG";

/// Application name for config directory resolution.
const APP_NAME: &str = "mdp";

/// Default config filename within the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration.
    pub config: ClientConfig,
    /// File the config was read from, if any.
    pub source: Option<PathBuf>,
    /// Warnings generated during loading (e.g., plaintext secrets).
    pub warnings: Vec<String>,
}

/// Default config file location, e.g. `~/.config/mdp/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME).join(CONFIG_FILE))
}

/// Discover and load the configuration.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let env_path = std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    load_config_from(explicit, env_path, default_config_path())
}

fn load_config_from(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    default_path: Option<PathBuf>,
) -> Result<LoadedConfig> {
    let required = explicit.map(Path::to_path_buf).or(env_path);

    let path = match required {
        Some(path) => path,
        None => match default_path {
            Some(path) if path.exists() => path,
            _ => {
                tracing::debug!("No config file found, using empty config");
                return Ok(LoadedConfig {
                    config: ClientConfig::new(),
                    source: None,
                    warnings: Vec::new(),
                });
            }
        },
    };

    let config = load_config_file(&path)?;
    let warnings = plaintext_warnings(&config);
    tracing::debug!(path = %path.display(), profiles = config.profiles.len(), "Loaded config");

    Ok(LoadedConfig {
        config,
        source: Some(path),
        warnings,
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<ClientConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    ClientConfig::from_toml(&contents)
}

fn plaintext_warnings(config: &ClientConfig) -> Vec<String> {
    config
        .profiles
        .iter()
        .filter(|(_, p)| p.secret.is_some())
        .map(|(name, _)| {
            format!(
                "profile '{}' stores its client secret in plaintext; consider secret-env",
                name
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_explicit_path() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[profiles.sandbox]
version = "preview1"
secret-env = "SANDBOX_SECRET"
"#,
        );

        let loaded = load_config_from(Some(&path), None, None).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert!(loaded.config.profile("sandbox").is_some());
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_explicit_path_beats_env_path() {
        let explicit = tempfile::tempdir().unwrap();
        let from_env = tempfile::tempdir().unwrap();
        let explicit_path = write_config(explicit.path(), "[profiles.a]\nversion = \"v1\"\n");
        let env_path = write_config(from_env.path(), "[profiles.b]\nversion = \"v1\"\n");

        let loaded = load_config_from(Some(&explicit_path), Some(env_path.clone()), None).unwrap();
        assert!(loaded.config.profile("a").is_some());

        let loaded = load_config_from(None, Some(env_path), None).unwrap();
        assert!(loaded.config.profile("b").is_some());
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = load_config_from(Some(&missing), None, None).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_missing_default_path_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("mdp").join("config.toml");
        let loaded = load_config_from(None, None, Some(missing)).unwrap();
        assert!(loaded.source.is_none());
        assert!(loaded.config.profiles.is_empty());
    }

    #[test]
    fn test_plaintext_secret_warning() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_config(
            temp.path(),
            r#"
[profiles.sandbox]
version = "preview1"
secret = "hunter2"
"#,
        );
        let loaded = load_config_from(None, None, Some(path)).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("sandbox"));
    }

    #[test]
    fn test_parse_error_surfaces() {
        let temp = tempfile::tempdir().unwrap();
        let path = write_config(temp.path(), "[profiles.sandbox\nversion = 1");
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_default_config_path_shape() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("mdp/config.toml"));
        }
    }
}
