//! Strategy selection between the two token sources.

use super::client_credentials::ClientCredentialsSource;
use super::exchange::TokenExchange;
use super::refresh::RefreshTokenSource;
use super::token::{Token, TokenProvider};
use crate::error::TokenError;

/// Which grant a [`TokenSource`] uses to renew its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    ClientCredentials,
    RefreshToken,
}

/// The token source of one client.
///
/// Chosen once by [`TokenSource::select`] and never switched afterwards.
#[derive(Debug)]
pub enum TokenSource {
    ClientCredentials(ClientCredentialsSource),
    RefreshToken(RefreshTokenSource),
}

impl TokenSource {
    /// Pick the refresh-token grant when the seed carries a refresh token,
    /// the client-credentials grant otherwise.
    #[must_use]
    pub fn select(exchange: TokenExchange, seed: Option<Token>) -> Self {
        let source = match seed {
            Some(token) if token.is_refreshable() => {
                Self::RefreshToken(RefreshTokenSource::new(exchange, token))
            }
            seed => Self::ClientCredentials(ClientCredentialsSource::new(exchange, seed)),
        };
        tracing::debug!(strategy = ?source.strategy(), "Selected token source");
        source
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        match self {
            Self::ClientCredentials(_) => Strategy::ClientCredentials,
            Self::RefreshToken(_) => Strategy::RefreshToken,
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for TokenSource {
    async fn token(&self) -> Result<Token, TokenError> {
        match self {
            Self::ClientCredentials(source) => source.token().await,
            Self::RefreshToken(source) => source.token().await,
        }
    }
}
