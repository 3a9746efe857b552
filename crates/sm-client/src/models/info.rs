use serde::{Deserialize, Serialize};

/// Answer of the `/v1/info` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    pub token_issuer_url: String,

    /// Whether the token endpoint expects Basic auth for client credentials.
    #[serde(default = "default_token_basic_auth")]
    pub token_basic_auth: bool,
}

const fn default_token_basic_auth() -> bool {
    true
}
