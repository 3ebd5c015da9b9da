//! OAuth2 client-credentials grant.

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::query::encode_query;

/// Content type for form-encoded bodies.
pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Grant type sent to the token endpoint.
const GRANT_TYPE: &str = "client_credentials";

/// Tokens returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    /// Captured when issued; never used for a refresh grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Lifetime in seconds, as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// When the token response was received.
    #[serde(default = "Utc::now")]
    pub obtained_at: DateTime<Utc>,
}

impl TokenSet {
    /// Expiry time derived from `expires_in`, if the server reported one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        Some(self.obtained_at + ChronoDuration::seconds(secs))
    }

    /// Whether the reported lifetime has elapsed. Tokens without a reported
    /// lifetime are never considered expired; the server's 401 is authoritative.
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Utc::now() >= at)
    }
}

/// Build the `Authorization` header value for HTTP Basic authentication.
pub fn basic_authorization(key: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", key, secret)))
}

/// Exchange the client key and secret for an access token.
///
/// Any failure, including a well-formed response without `access_token`,
/// is reported as [`Error::Authentication`]. Nothing is retried here.
pub async fn request_token(
    http: &reqwest::Client,
    token_url: &Url,
    key: &str,
    secret: &str,
    scope: Option<&str>,
) -> Result<TokenSet> {
    let mut form = vec![("grant_type", GRANT_TYPE)];
    if let Some(scope) = scope {
        form.push(("scope", scope));
    }

    tracing::debug!(url = %token_url, "Requesting client-credentials token");

    let response = http
        .post(token_url.clone())
        .header(AUTHORIZATION, basic_authorization(key, secret))
        .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
        .body(encode_query(form))
        .send()
        .await
        .map_err(|e| Error::Authentication {
            message: format!("token request failed: {}", e),
            status: None,
            body: None,
            source: Some(e),
        })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| Error::Authentication {
        message: format!("failed to read token response: {}", e),
        status: Some(status.as_u16()),
        body: None,
        source: Some(e),
    })?;

    if !status.is_success() {
        return Err(Error::Authentication {
            message: format!("token endpoint returned HTTP {}", status.as_u16()),
            status: Some(status.as_u16()),
            body: Some(text),
            source: None,
        });
    }

    let tokens = parse_token_response(&text).map_err(|message| Error::Authentication {
        message,
        status: Some(status.as_u16()),
        body: Some(text.clone()),
        source: None,
    })?;

    tracing::debug!(
        token_type = tokens.token_type.as_deref().unwrap_or("unknown"),
        expires_in = tokens.expires_in,
        "Token received"
    );
    Ok(tokens)
}

/// Parse a token endpoint body, stamping `obtained_at` with the current time.
fn parse_token_response(text: &str) -> std::result::Result<TokenSet, String> {
    #[derive(Deserialize)]
    struct RawTokenResponse {
        access_token: Option<String>,
        refresh_token: Option<String>,
        token_type: Option<String>,
        expires_in: Option<serde_json::Value>,
    }

    let raw: RawTokenResponse = serde_json::from_str(text)
        .map_err(|e| format!("failed to parse token response: {}", e))?;

    let access_token = raw
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "token response has no access_token".to_string())?;

    // Some deployments report the lifetime as a string.
    let expires_in = raw.expires_in.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });

    Ok(TokenSet {
        access_token,
        refresh_token: raw.refresh_token,
        token_type: raw.token_type,
        expires_in,
        obtained_at: Utc::now(),
    })
}
