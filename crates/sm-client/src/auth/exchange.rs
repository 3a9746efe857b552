//! Token endpoint grant exchanges.

use chrono::{DateTime, Duration, Utc};
use reqwest::header;
use serde::Deserialize;
use url::Url;

use super::discovery::ProviderMetadata;
use super::options::Options;
use super::token::Token;
use crate::error::{ClientError, ClientResult, TokenError};

/// How client credentials reach the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Basic` header.
    BasicHeader,
    /// `client_id` and `client_secret` form fields.
    RequestBody,
}

impl AuthStyle {
    #[must_use]
    pub const fn from_basic_auth(token_basic_auth: bool) -> Self {
        if token_basic_auth { Self::BasicHeader } else { Self::RequestBody }
    }
}

/// Performs client-credentials and refresh-token grants against one token endpoint.
#[derive(Clone)]
pub struct TokenExchange {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    auth_style: AuthStyle,
}

impl TokenExchange {
    /// Build an exchange for the discovered token endpoint.
    ///
    /// `http` should be the client used for every other call so that TLS
    /// verification and timeout settings match.
    pub fn new(
        http: reqwest::Client,
        options: &Options,
        metadata: &ProviderMetadata,
    ) -> ClientResult<Self> {
        let token_url = Url::parse(&metadata.token_endpoint)
            .map_err(|err| ClientError::invalid_url(&metadata.token_endpoint, err))?;

        Ok(Self {
            http,
            token_url,
            client_id: options.client_id.clone(),
            client_secret: options.client_secret.clone(),
            auth_style: AuthStyle::from_basic_auth(options.token_basic_auth),
        })
    }

    #[must_use]
    pub const fn auth_style(&self) -> AuthStyle {
        self.auth_style
    }

    #[must_use]
    pub const fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Obtain a new token with the client id and secret.
    pub async fn client_credentials(&self) -> Result<Token, TokenError> {
        self.exchange("client_credentials", Vec::new()).await
    }

    /// Trade a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, TokenError> {
        self.exchange("refresh_token", vec![("refresh_token", refresh_token.to_string())]).await
    }

    async fn exchange(
        &self,
        grant_type: &'static str,
        mut form: Vec<(&'static str, String)>,
    ) -> Result<Token, TokenError> {
        form.insert(0, ("grant_type", grant_type.to_string()));

        let mut request =
            self.http.post(self.token_url.clone()).header(header::ACCEPT, "application/json");

        // RFC 6749 2.3.1: credentials are form-encoded before Basic encoding.
        match self.auth_style {
            AuthStyle::BasicHeader => {
                request = request
                    .basic_auth(form_encode(&self.client_id), Some(form_encode(&self.client_secret)));
            }
            AuthStyle::RequestBody => {
                form.push(("client_id", self.client_id.clone()));
                form.push(("client_secret", self.client_secret.clone()));
            }
        }

        tracing::debug!(grant_type, token_url = %self.token_url, "Requesting token");

        let response = request.form(&form).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(grant_type, status = status.as_u16(), "Token endpoint rejected grant");
            return Err(TokenError::Status { status: status.as_u16(), body });
        }

        let token = parse_token_response(&content_type, &body, Utc::now())?;
        tracing::debug!(grant_type, expiry = ?token.expiry, "Obtained token");
        Ok(token)
    }
}

impl std::fmt::Debug for TokenExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenExchange")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("auth_style", &self.auth_style)
            .finish()
    }
}

fn form_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<ExpiresIn>,
}

/// Some providers send `expires_in` as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(i64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<i64> {
        match self {
            Self::Seconds(seconds) => Some(*seconds),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

fn is_form_encoded(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("application/x-www-form-urlencoded")
        || mime.eq_ignore_ascii_case("text/plain")
}

fn parse_token_response(
    content_type: &str,
    body: &str,
    now: DateTime<Utc>,
) -> Result<Token, TokenError> {
    let response = if is_form_encoded(content_type) {
        let mut response = TokenResponse::default();
        for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
            match key.as_ref() {
                "access_token" => response.access_token = value.into_owned(),
                "token_type" => response.token_type = value.into_owned(),
                "refresh_token" => response.refresh_token = Some(value.into_owned()),
                "expires_in" => response.expires_in = Some(ExpiresIn::Text(value.into_owned())),
                _ => {}
            }
        }
        response
    } else {
        serde_json::from_str(body).map_err(|err| TokenError::Malformed(err.to_string()))?
    };

    if response.access_token.is_empty() {
        return Err(TokenError::MissingAccessToken);
    }

    let expiry = response
        .expires_in
        .as_ref()
        .and_then(ExpiresIn::seconds)
        .filter(|seconds| *seconds > 0)
        // Lifetimes past the representable range never expire in practice.
        .and_then(|seconds| {
            Duration::try_seconds(seconds).and_then(|ttl| now.checked_add_signed(ttl))
        });

    Ok(Token {
        access_token: response.access_token,
        refresh_token: response.refresh_token.filter(|token| !token.is_empty()),
        expiry,
        token_type: response.token_type,
    })
}
