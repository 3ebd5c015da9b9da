//! Main client implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::path::join_path;
use crate::query::Params;
use crate::token::{FORM_CONTENT_TYPE, TokenSet, request_token};
use crate::version::ApiVersion;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.athenahealth.com/";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP verb of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }

    /// POST and PUT carry parameters in the body, GET and DELETE in the query.
    pub fn sends_body(self) -> bool {
        matches!(self, Verb::Post | Verb::Put)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// Authenticated connection to the API.
///
/// A `Connection` holds the client credentials and the most recently issued
/// access token. Every call carries the token as a bearer credential; a call
/// answered with 401 re-authenticates once and is retried once.
///
/// Cloning is cheap and clones share the token, so a single connection can be
/// handed to every task that needs it.
///
/// # Example
///
/// ```no_run
/// use mdp_client::{ApiVersion, Connection, Params};
///
/// # async fn example() -> mdp_client::Result<()> {
/// let conn = Connection::builder()
///     .version(ApiVersion::Preview1)
///     .credentials("key", "secret")
///     .practice_id("195900")
///     .connect()
///     .await?;
///
/// let departments = conn.get("/departments", &Params::new()).await?;
/// println!("{}", departments["totalcount"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connection {
    /// Inner shared state.
    inner: Arc<ConnectionInner>,
}

/// Inner connection state (shared across clones).
struct ConnectionInner {
    http: reqwest::Client,
    base_url: Url,
    auth_url: Url,
    version: ApiVersion,
    client_key: String,
    client_secret: String,
    scope: Option<String>,
    practice_id: RwLock<Option<String>>,
    token: RwLock<TokenState>,
    /// Serializes token grants so concurrent 401s trigger a single refresh.
    auth_gate: Mutex<()>,
}

/// Current tokens plus a counter bumped on every successful grant.
struct TokenState {
    tokens: TokenSet,
    generation: u64,
}

impl Connection {
    /// Create a new connection builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// API version this connection talks to.
    pub fn version(&self) -> ApiVersion {
        self.inner.version
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Token endpoint used for authentication.
    pub fn auth_url(&self) -> &Url {
        &self.inner.auth_url
    }

    /// The current access token.
    pub fn token(&self) -> String {
        self.inner.token.read().tokens.access_token.clone()
    }

    /// Everything the token endpoint returned on the last grant.
    pub fn tokens(&self) -> TokenSet {
        self.inner.token.read().tokens.clone()
    }

    /// Practice ID inserted into request paths, if set.
    pub fn practice_id(&self) -> Option<String> {
        self.inner.practice_id.read().clone()
    }

    /// Scope subsequent requests to a practice.
    ///
    /// Surrounding slashes are dropped; an empty ID clears the scope.
    pub fn set_practice_id(&self, practice_id: impl Into<String>) {
        *self.inner.practice_id.write() = normalize_practice_id(practice_id.into());
    }

    /// Stop scoping requests to a practice.
    pub fn clear_practice_id(&self) {
        *self.inner.practice_id.write() = None;
    }

    /// Full request path for `path`: version, practice ID (if set), then `path`.
    pub fn build_path(&self, path: &str) -> String {
        let practice_id = self.practice_id();
        let segments = [
            self.inner.version.as_str(),
            practice_id.as_deref().unwrap_or(""),
            path,
        ];
        format!("/{}", join_path(segments))
    }

    /// Run the client-credentials grant and replace the cached tokens.
    pub async fn authenticate(&self) -> Result<()> {
        let _gate = self.inner.auth_gate.lock().await;
        let tokens = self.fetch_tokens().await?;
        self.store_tokens(tokens);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API calls
    // ─────────────────────────────────────────────────────────────────────────

    /// Make a GET request; `params` go in the query string.
    pub async fn get(&self, path: &str, params: &Params) -> Result<Value> {
        self.request(Verb::Get, path, params, &HeaderMap::new()).await
    }

    /// Make a POST request; `params` go in the form body.
    pub async fn post(&self, path: &str, params: &Params) -> Result<Value> {
        self.request(Verb::Post, path, params, &HeaderMap::new()).await
    }

    /// Make a PUT request; `params` go in the form body.
    pub async fn put(&self, path: &str, params: &Params) -> Result<Value> {
        self.request(Verb::Put, path, params, &HeaderMap::new()).await
    }

    /// Make a DELETE request; `params` go in the query string.
    pub async fn delete(&self, path: &str, params: &Params) -> Result<Value> {
        self.request(Verb::Delete, path, params, &HeaderMap::new()).await
    }

    /// Make a request with extra headers.
    ///
    /// Caller headers are applied after the bearer and content-type headers
    /// and replace them on conflict. The decoded JSON body is returned whatever
    /// the status code; API-level errors are for the caller to inspect.
    pub async fn request(
        &self,
        verb: Verb,
        path: &str,
        params: &Params,
        headers: &HeaderMap,
    ) -> Result<Value> {
        let url = self.request_url(verb, path, params);
        let body = verb.sends_body().then(|| params.encode());

        let (token, generation) = self.token_snapshot();
        let mut response = self
            .dispatch(verb, &url, body.as_deref(), headers, &token)
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(method = %verb, path = url.path(), "Unauthorized, re-authenticating once");
            let token = self.refresh_after_unauthorized(generation).await?;
            response = self
                .dispatch(verb, &url, body.as_deref(), headers, &token)
                .await?;
        }

        decode_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// A query embedded in `path` is kept and precedes GET/DELETE params.
    fn request_url(&self, verb: Verb, path: &str, params: &Params) -> Url {
        let (path, embedded) = match path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path, ""),
        };
        let mut url = resolve(&self.inner.base_url, &self.build_path(path));

        let mut query = embedded.to_string();
        if !verb.sends_body() && !params.is_empty() {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(&params.encode());
        }
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        url
    }

    async fn dispatch(
        &self,
        verb: Verb,
        url: &Url,
        body: Option<&str>,
        headers: &HeaderMap,
        token: &str,
    ) -> Result<reqwest::Response> {
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| Error::InvalidHeader("access token is not a valid header value".into()))?;

        let mut request_headers = HeaderMap::new();
        request_headers.insert(AUTHORIZATION, bearer);
        if body.is_some() {
            request_headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }
        for name in headers.keys() {
            request_headers.remove(name);
        }
        for (name, value) in headers {
            request_headers.append(name.clone(), value.clone());
        }

        tracing::trace!(method = %verb, url = %url, "Dispatching request");

        let mut request = self
            .inner
            .http
            .request(verb.method(), url.clone())
            .headers(request_headers);
        if let Some(body) = body {
            request = request.body(body.to_string());
        }
        Ok(request.send().await?)
    }

    fn token_snapshot(&self) -> (String, u64) {
        let state = self.inner.token.read();
        (state.tokens.access_token.clone(), state.generation)
    }

    /// Obtain a token newer than `seen_generation`.
    ///
    /// If another call already refreshed the token while this one waited on
    /// the gate, that token is reused and no second grant is made.
    async fn refresh_after_unauthorized(&self, seen_generation: u64) -> Result<String> {
        let _gate = self.inner.auth_gate.lock().await;
        {
            let state = self.inner.token.read();
            if state.generation != seen_generation {
                tracing::debug!("Token already refreshed by a concurrent call");
                return Ok(state.tokens.access_token.clone());
            }
        }

        let tokens = self.fetch_tokens().await?;
        let token = tokens.access_token.clone();
        self.store_tokens(tokens);
        Ok(token)
    }

    async fn fetch_tokens(&self) -> Result<TokenSet> {
        let inner = &self.inner;
        request_token(
            &inner.http,
            &inner.auth_url,
            &inner.client_key,
            &inner.client_secret,
            inner.scope.as_deref(),
        )
        .await
    }

    fn store_tokens(&self, tokens: TokenSet) {
        let mut state = self.inner.token.write();
        state.tokens = tokens;
        state.generation += 1;
        tracing::debug!(generation = state.generation, "Access token replaced");
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.inner.base_url.as_str())
            .field("version", &self.inner.version)
            .field("practice_id", &self.practice_id())
            .field("client_key", &self.inner.client_key)
            .field("client_secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

fn normalize_practice_id(practice_id: String) -> Option<String> {
    let trimmed = practice_id.trim_matches('/');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Append an absolute request path to the base URL's path.
fn resolve(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url.set_query(None);
    url
}

/// Read a response body and decode it as JSON.
async fn decode_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(source) => Err(Error::Decode {
            status,
            body,
            source,
        }),
    }
}

/// Builder for creating a [`Connection`].
#[derive(Debug)]
pub struct ClientBuilder {
    version: Option<ApiVersion>,
    environment: Option<Environment>,
    client_key: Option<String>,
    client_secret: Option<String>,
    practice_id: Option<String>,
    base_url: Option<String>,
    auth_path: Option<String>,
    scope: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            version: None,
            environment: None,
            client_key: None,
            client_secret: None,
            practice_id: None,
            base_url: None,
            auth_path: None,
            scope: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the API version.
    pub fn version(mut self, version: ApiVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Preset the host, token path and scope for a platform environment.
    ///
    /// `base_url`, `auth_path` and `scope` override the preset whatever the
    /// call order.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Set the client key (also known as client ID) and secret.
    pub fn credentials(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_key = Some(key.into());
        self.client_secret = Some(secret.into());
        self
    }

    /// Set the initial practice ID.
    pub fn practice_id(mut self, practice_id: impl Into<String>) -> Self {
        self.practice_id = Some(practice_id.into());
        self
    }

    /// Set the API host (defaults to [`DEFAULT_BASE_URL`], or the
    /// environment's host).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the token endpoint path.
    ///
    /// By default it is derived from the version, e.g. `/oauthpreview/token`.
    pub fn auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = Some(path.into());
        self
    }

    /// Request a scope with the client-credentials grant.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the connection and authenticate.
    ///
    /// The returned connection always holds a valid access token.
    pub async fn connect(self) -> Result<Connection> {
        let version = self
            .version
            .ok_or_else(|| Error::Config("API version is required".to_string()))?;
        let client_key = non_empty(self.client_key)
            .ok_or_else(|| Error::Config("client key is required".to_string()))?;
        let client_secret = non_empty(self.client_secret)
            .ok_or_else(|| Error::Config("client secret is required".to_string()))?;

        let environment = self.environment;
        let base_url = self
            .base_url
            .or_else(|| environment.map(|env| env.base_url().to_string()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        // Parse and normalize base URL
        let mut base_url = Url::parse(&base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("'{}' cannot be a base URL", base_url)));
        }
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let auth_path = match (self.auth_path, environment) {
            (Some(path), _) => join_path([path]),
            (None, Some(env)) => join_path([env.auth_path()]),
            (None, None) => join_path([version.auth_prefix(), "token"]),
        };
        let auth_url = resolve(&base_url, &format!("/{}", auth_path));

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("mdp-client/{}", env!("CARGO_PKG_VERSION")));

        // Certificate validation is never disabled.
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .build()?;

        let scope =
            non_empty(self.scope).or_else(|| environment.map(|env| env.scope().to_string()));
        let tokens = request_token(
            &http,
            &auth_url,
            &client_key,
            &client_secret,
            scope.as_deref(),
        )
        .await?;

        let practice_id = self.practice_id.and_then(normalize_practice_id);

        tracing::debug!(%base_url, %version, environment = ?environment, "Connection authenticated");

        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                http,
                base_url,
                auth_url,
                version,
                client_key,
                client_secret,
                scope,
                practice_id: RwLock::new(practice_id),
                token: RwLock::new(TokenState {
                    tokens,
                    generation: 0,
                }),
                auth_gate: Mutex::new(()),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
