//! OAuth2 tokens and the capability to obtain a valid one.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// An OAuth2 access token with its optional refresh token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The value sent in the `Authorization` header.
    pub access_token: String,

    /// Refresh token, when the provider issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Instant at which the access token stops being valid.
    ///
    /// `None` means the token does not expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    /// Token type as reported by the provider, usually `bearer`.
    #[serde(default)]
    pub token_type: String,
}

impl Token {
    /// Create a bearer token without refresh token.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>, expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expiry,
            token_type: "bearer".to_string(),
        }
    }

    /// Attach a refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// True while the access token is set and `now` is before the expiry.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && self.expiry.is_none_or(|expiry| now < expiry)
    }

    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    /// True if the token carries a non-empty refresh token.
    #[must_use]
    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// Authorization scheme for this token type.
    ///
    /// `bearer`, `mac` and `basic` are normalized to their canonical
    /// spelling and an empty type means `Bearer`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        if self.token_type.is_empty() || self.token_type.eq_ignore_ascii_case("bearer") {
            "Bearer"
        } else if self.token_type.eq_ignore_ascii_case("mac") {
            "MAC"
        } else if self.token_type.eq_ignore_ascii_case("basic") {
            "Basic"
        } else {
            &self.token_type
        }
    }

    /// Value of the `Authorization` header carrying this token.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("{} {}", self.scheme(), self.access_token)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[censored]")
            .field("has_refresh_token", &self.is_refreshable())
            .field("expiry", &self.expiry)
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Something that can hand out a currently valid [`Token`].
///
/// Implementations may perform network I/O and update their cached token.
#[async_trait::async_trait]
pub trait TokenProvider: fmt::Debug + Send + Sync {
    async fn token(&self) -> Result<Token, TokenError>;
}
