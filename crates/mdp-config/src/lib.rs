//! Configuration for the mdp client.
//!
//! Provides TOML-based configuration with:
//! - Named connection profiles (`[profiles.sandbox]`, `[profiles.prod]`, etc.)
//! - A `default-profile` used when none is named
//! - Config file discovery (explicit path → `MDP_CONFIG` → user config dir)
//! - Credential resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    CONFIG_ENV, LoadedConfig, default_config_path, load_config, load_config_file,
};
pub use error::{ConfigError, Result};
pub use secrets::{
    KEY_ENV, ResolvedSecret, SECRET_ENV, SecretSource, resolve_key, resolve_key_with,
    resolve_secret, resolve_secret_with,
};
pub use types::{ClientConfig, Profile};
