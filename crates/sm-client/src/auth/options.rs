use std::fmt;
use std::time::Duration;

use crate::config::Config;
use crate::models::Info;

/// Credentials and transport settings for the token handshake.
#[derive(Clone)]
pub struct Options {
    /// OpenID issuer, as advertised by the Service Manager info endpoint.
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Skip TLS certificate verification.
    pub ssl_disabled: bool,
    pub timeout: Duration,
    /// Send client credentials as HTTP Basic auth instead of form fields.
    pub token_basic_auth: bool,
}

impl Options {
    /// Combine client configuration with the advertised token issuer.
    #[must_use]
    pub fn from_info(config: &Config, info: &Info) -> Self {
        Self {
            issuer_url: info.token_issuer_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            ssl_disabled: config.ssl_disabled,
            timeout: config.timeout,
            token_basic_auth: info.token_basic_auth,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("issuer_url", &self.issuer_url)
            .field("client_id", &self.client_id)
            .field("ssl_disabled", &self.ssl_disabled)
            .field("timeout", &self.timeout)
            .field("token_basic_auth", &self.token_basic_auth)
            .finish()
    }
}
