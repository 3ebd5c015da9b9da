//! Platform environments and their endpoint presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Token path shared by the platform environments.
const PLATFORM_AUTH_PATH: &str = "/oauth2/v1/token";

/// Scope granting access to the MDP endpoints.
const PLATFORM_SCOPE: &str = "athena/service/Athenanet.MDP.*";

/// Hosted platform environment.
///
/// Selecting an environment presets the host, the token path and the grant
/// scope. Explicit builder settings still take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Preview,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Prod, Environment::Preview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Preview => "preview",
        }
    }

    /// API host for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Prod => "https://api.platform.athenahealth.com/",
            Environment::Preview => "https://api.preview.platform.athenahealth.com/",
        }
    }

    pub fn auth_path(&self) -> &'static str {
        PLATFORM_AUTH_PATH
    }

    pub fn scope(&self) -> &'static str {
        PLATFORM_SCOPE
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Environment::Prod),
            "preview" => Ok(Environment::Preview),
            _ => Err(Error::Config(format!(
                "unknown environment '{}' (expected prod or preview)",
                s
            ))),
        }
    }
}
