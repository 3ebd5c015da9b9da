//! Token command - authenticate and show the issued token.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use mdp_client::TokenSet;
use serde::Serialize;

use super::Context;

/// Arguments for the token command.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Include the access token itself in the output
    #[arg(long)]
    pub show: bool,
}

/// Token summary for output.
#[derive(Debug, Serialize)]
struct TokenOutput {
    version: String,
    auth_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    token_type: Option<String>,
    obtained_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    expired: bool,
    has_refresh_token: bool,
}

impl TokenOutput {
    fn new(version: String, auth_url: String, tokens: TokenSet, show: bool) -> Self {
        Self {
            version,
            auth_url,
            expires_at: tokens.expires_at(),
            expired: tokens.is_expired(),
            has_refresh_token: tokens.refresh_token.is_some(),
            access_token: show.then_some(tokens.access_token),
            token_type: tokens.token_type,
            obtained_at: tokens.obtained_at,
        }
    }
}

/// Run the token command.
pub async fn run(args: TokenArgs, ctx: &Context) -> Result<()> {
    let conn = ctx.connect().await?;
    let output = TokenOutput::new(
        conn.version().to_string(),
        conn.auth_url().to_string(),
        conn.tokens(),
        args.show,
    );
    ctx.print_json(&output)
}
