//! Error types for the Service Manager client.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::fmt;

use reqwest::StatusCode;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error not caused by token acquisition
    #[error("Middleware error: {0}")]
    Middleware(anyhow::Error),

    /// The OpenID provider metadata could not be fetched or decoded
    #[error("Discovery failed for {url}: {reason}")]
    Discovery {
        /// Discovery document URL
        url: String,
        /// What went wrong
        reason: String,
    },

    /// A token could not be obtained from the token endpoint
    #[error("Cannot fetch token: {0}")]
    Token(#[from] TokenError),

    /// The API answered with a non-success status
    #[error(transparent)]
    Response(#[from] ResourceError),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configured URL is malformed
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Parser error
        source: url::ParseError,
    },

    /// A token could not be turned into an `Authorization` header value
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl ClientError {
    /// Create a discovery error.
    #[must_use]
    pub fn discovery(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Discovery { url: url.into(), reason: reason.to_string() }
    }

    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl { url: url.into(), source }
    }

    /// The resource error behind this error, if the API rejected the call.
    #[must_use]
    pub const fn resource_error(&self) -> Option<&ResourceError> {
        match self {
            Self::Response(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of a rejected API call.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.resource_error().map(ResourceError::status_code)
    }
}

impl From<reqwest_middleware::Error> for ClientError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => Self::Http(err),
            reqwest_middleware::Error::Middleware(err) => match err.downcast::<TokenError>() {
                Ok(token_err) => Self::Token(token_err),
                Err(other) => match other.downcast::<reqwest::header::InvalidHeaderValue>() {
                    Ok(header_err) => Self::InvalidHeader(header_err),
                    Err(other) => Self::Middleware(other),
                },
            },
        }
    }
}

/// Errors from the OAuth2 token endpoint.
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    /// The token endpoint could not be reached
    #[error("token endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The token endpoint rejected the grant
    #[error("token endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The response carried no access token
    #[error("server response missing access_token")]
    MissingAccessToken,

    /// The response body could not be decoded
    #[error("malformed token response: {0}")]
    Malformed(String),
}

impl TokenError {
    /// HTTP status returned by the token endpoint, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A non-success answer from the Service Manager API.
///
/// Carries the status and URL of the failed call plus the `error` and
/// `description` fields of the response body when the server sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceError {
    /// HTTP status code
    pub status: u16,
    /// Request URL
    pub url: String,
    /// Server-supplied error code (`error` field)
    pub error: Option<String>,
    /// Server-supplied human description (`description` field)
    pub description: Option<String>,
}

impl ResourceError {
    /// Create an error carrying only status and URL.
    #[must_use]
    pub fn new(status: StatusCode, url: impl Into<String>) -> Self {
        Self { status: status.as_u16(), url: url.into(), error: None, description: None }
    }

    /// Status as a typed code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        self.status == 403
    }

    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status <= 599
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request {} failed with status {}", self.url, self.status)?;
        match (&self.error, &self.description) {
            (Some(error), Some(description)) => write!(f, ": {error}: {description}"),
            (Some(message), None) | (None, Some(message)) => write!(f, ": {message}"),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for ResourceError {}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
