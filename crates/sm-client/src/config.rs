//! Configuration for the Service Manager client.

use std::fmt;
use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Timeout applied to discovery, token exchange and resource calls.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Client id used when none is configured.
    pub const DEFAULT_CLIENT_ID: &str = "smctl";

    /// OpenID provider metadata location, relative to the issuer.
    pub const OPENID_CONFIGURATION: &str = "/.well-known/openid-configuration";
}

/// Service Manager API paths.
pub mod paths {
    pub const INFO: &str = "/v1/info";
    pub const PLATFORMS: &str = "/v1/platforms";
    pub const SERVICE_BROKERS: &str = "/v1/service_brokers";
    pub const VISIBILITIES: &str = "/v1/visibilities";
    pub const SERVICE_OFFERINGS: &str = "/v1/service_offerings";
    pub const SERVICE_PLANS: &str = "/v1/service_plans";
}

/// Client configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the Service Manager.
    pub url: String,

    /// OAuth2 client id.
    pub client_id: String,

    /// OAuth2 client secret.
    pub client_secret: String,

    /// Skip TLS certificate verification.
    pub ssl_disabled: bool,

    /// Timeout for every outbound call.
    pub timeout: Duration,
}

impl Config {
    /// Create a new configuration with the default timeout and TLS verification on.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ssl_disabled: false,
            timeout: api::REQUEST_TIMEOUT,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            url: base_url.to_string(),
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            ssl_disabled: false,
            timeout: Duration::from_secs(5),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `SM_URL` (required), `SM_CLIENT_ID`, `SM_CLIENT_SECRET`,
    /// `SM_SKIP_SSL_VALIDATION` and `SM_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns error if `SM_URL` is missing or a variable is invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("SM_URL").map_err(|_| anyhow::anyhow!("SM_URL is not set"))?;
        let client_id =
            std::env::var("SM_CLIENT_ID").unwrap_or_else(|_| api::DEFAULT_CLIENT_ID.to_string());
        let client_secret = std::env::var("SM_CLIENT_SECRET").unwrap_or_default();

        let mut config = Self::new(url, client_id, client_secret);

        if let Ok(value) = std::env::var("SM_SKIP_SSL_VALIDATION") {
            config.ssl_disabled = value.parse()?;
        }
        if let Ok(value) = std::env::var("SM_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(value.parse()?);
        }

        Ok(config)
    }

    /// Disable or enable TLS certificate verification.
    #[must_use]
    pub fn with_ssl_disabled(mut self, ssl_disabled: bool) -> Self {
        self.ssl_disabled = ssl_disabled;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check if a client secret is configured.
    #[must_use]
    pub fn has_client_secret(&self) -> bool {
        !self.client_secret.is_empty()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("has_client_secret", &self.has_client_secret())
            .field("ssl_disabled", &self.ssl_disabled)
            .field("timeout", &self.timeout)
            .finish()
    }
}
