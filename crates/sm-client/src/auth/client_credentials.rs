//! Token source backed by the client-credentials grant.

use tokio::sync::Mutex;

use super::exchange::TokenExchange;
use super::token::{Token, TokenProvider};
use crate::error::TokenError;

/// Fetches tokens with the client id and secret and reuses them until they expire.
///
/// The cache lock is held for the whole exchange, so callers that find the
/// token stale at the same time wait for a single exchange instead of
/// starting their own.
#[derive(Debug)]
pub struct ClientCredentialsSource {
    exchange: TokenExchange,
    cached: Mutex<Option<Token>>,
}

impl ClientCredentialsSource {
    /// Create a source, optionally seeded with a token to reuse while it is fresh.
    #[must_use]
    pub fn new(exchange: TokenExchange, seed: Option<Token>) -> Self {
        Self { exchange, cached: Mutex::new(seed) }
    }
}

#[async_trait::async_trait]
impl TokenProvider for ClientCredentialsSource {
    async fn token(&self) -> Result<Token, TokenError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.clone());
        }

        tracing::debug!("No fresh token cached, running client credentials grant");
        let token = self.exchange.client_credentials().await?;
        *cached = Some(token.clone());

        Ok(token)
    }
}
