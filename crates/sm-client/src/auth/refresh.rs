//! Token source backed by the refresh-token grant.

use tokio::sync::Mutex;

use super::exchange::TokenExchange;
use super::token::{Token, TokenProvider};
use crate::error::TokenError;

/// Keeps an access/refresh token pair and refreshes the access token on expiry.
///
/// Never falls back to the client-credentials grant: a rejected refresh
/// token surfaces as an error on every call.
#[derive(Debug)]
pub struct RefreshTokenSource {
    exchange: TokenExchange,
    cached: Mutex<Token>,
}

impl RefreshTokenSource {
    #[must_use]
    pub fn new(exchange: TokenExchange, seed: Token) -> Self {
        Self { exchange, cached: Mutex::new(seed) }
    }
}

#[async_trait::async_trait]
impl TokenProvider for RefreshTokenSource {
    async fn token(&self) -> Result<Token, TokenError> {
        let mut cached = self.cached.lock().await;

        if cached.is_fresh() {
            return Ok(cached.clone());
        }

        let refresh_token = cached.refresh_token.clone().unwrap_or_default();
        tracing::debug!("Access token expired, running refresh token grant");

        let mut token = self.exchange.refresh(&refresh_token).await?;
        // Providers may omit the refresh token when it stays valid.
        if !token.is_refreshable() {
            token.refresh_token = Some(refresh_token);
        }
        *cached = token.clone();

        Ok(token)
    }
}
