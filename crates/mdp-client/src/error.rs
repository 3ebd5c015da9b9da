//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The client-credentials grant did not produce a usable access token.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// What went wrong.
        message: String,
        /// HTTP status of the token response, if one was received.
        status: Option<u16>,
        /// Raw token response body, if one was received.
        body: Option<String>,
        /// Underlying transport error, if any.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The request never produced a readable response.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("Invalid JSON in HTTP {status} response: {source}")]
    Decode {
        /// HTTP status code of the response.
        status: u16,
        /// The body exactly as received.
        body: String,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A caller-supplied header name or value was rejected.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// Check if this is a transport error.
    pub fn is_transport_error(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Authentication { source, .. } => source.is_some(),
            _ => false,
        }
    }

    /// The raw response body carried by this error, if any.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Error::Decode { body, .. } => Some(body),
            Error::Authentication { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Decode { status, .. } => Some(*status),
            Error::Authentication { status, .. } => *status,
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
