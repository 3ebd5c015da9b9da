//! Request commands - get, post, put and delete.

use anyhow::{Result, bail};
use clap::Args;
use mdp_client::{HeaderMap, HeaderName, HeaderValue, Params, Verb};

use super::Context;

/// Arguments shared by the request commands.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Resource path, e.g. /patients/123
    pub path: String,

    /// Request parameter as key=value (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Extra header as name:value (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

/// Run a request command.
pub async fn run(verb: Verb, args: RequestArgs, ctx: &Context) -> Result<()> {
    let headers = header_map(&args.headers)?;
    let params: Params = args.params.into_iter().collect();

    let conn = ctx.connect().await?;
    tracing::debug!(%verb, path = %conn.build_path(&args.path), "Sending request");

    let body = conn.request(verb, &args.path, &params, &headers).await?;
    ctx.print_json(&body)
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected name:value, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn header_map(pairs: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            bail!("invalid header name '{}'", name);
        };
        let Ok(header_value) = HeaderValue::from_str(value) else {
            bail!("invalid value for header '{}'", name);
        };
        headers.append(header_name, header_value);
    }
    Ok(headers)
}
