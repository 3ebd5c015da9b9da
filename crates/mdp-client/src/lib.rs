//! HTTP client for the athenahealth More Disruption Please API.
//!
//! A [`Connection`] authenticates with the OAuth2 client-credentials grant,
//! caches the bearer token and attaches it to every call. A call answered
//! with 401 Unauthorized triggers one re-authentication and one retry; the
//! retried response is returned whatever its status.
//!
//! # Example
//!
//! ```no_run
//! use mdp_client::{ApiVersion, Connection, Params, Result};
//!
//! # async fn example() -> Result<()> {
//! let conn = Connection::builder()
//!     .version(ApiVersion::Preview1)
//!     .credentials("client-key", "client-secret")
//!     .connect()
//!     .await?;
//!
//! // Practices visible to these credentials
//! let practices = conn.get("/practiceinfo", &Params::new()).await?;
//! println!("{}", practices);
//!
//! // Scope later calls to one practice
//! conn.set_practice_id("195900");
//! let patient = conn
//!     .post("/patients", &Params::from([("lastname", "Foo"), ("departmentid", "1")]))
//!     .await?;
//! println!("{}", patient);
//! # Ok(())
//! # }
//! ```
//!
//! Responses are returned as [`serde_json::Value`]. A body carrying an
//! API-level `error` field is still a successful call from the client's side.

pub mod client;
pub mod environment;
pub mod error;
pub mod path;
pub mod query;
pub mod token;
pub mod version;

pub use client::{ClientBuilder, Connection, DEFAULT_BASE_URL, Verb};
pub use environment::Environment;
pub use error::{Error, Result};
pub use path::join_path;
pub use query::{Params, encode_query};
pub use token::{TokenSet, basic_authorization};
pub use version::ApiVersion;

pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
