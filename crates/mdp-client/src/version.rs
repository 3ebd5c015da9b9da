//! API versions and their authentication prefixes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Version of the API a connection talks to.
///
/// The version is the first segment of every authorized request path and
/// selects the OAuth endpoint used for the client-credentials grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "preview1")]
    Preview1,
    #[serde(rename = "openpreview1")]
    OpenPreview1,
}

impl ApiVersion {
    /// All known versions.
    pub const ALL: [ApiVersion; 3] = [
        ApiVersion::V1,
        ApiVersion::Preview1,
        ApiVersion::OpenPreview1,
    ];

    /// Path segment used in request URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::Preview1 => "preview1",
            ApiVersion::OpenPreview1 => "openpreview1",
        }
    }

    /// Path prefix of the OAuth endpoint for this version.
    pub fn auth_prefix(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "/oauth",
            ApiVersion::Preview1 => "/oauthpreview",
            ApiVersion::OpenPreview1 => "/oauthopenpreview",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == name)
            .ok_or_else(|| {
                Error::Config(format!(
                    "unknown API version '{}' (expected v1, preview1 or openpreview1)",
                    s
                ))
            })
    }
}
