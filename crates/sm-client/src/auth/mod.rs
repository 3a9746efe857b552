//! OAuth2 authentication against the Service Manager's token issuer.
//!
//! ## Flow
//! 1. [`fetch_openid_configuration`] resolves the token endpoint of the issuer.
//! 2. [`TokenSource::select`] picks the client-credentials or refresh-token
//!    grant, once, based on the optional seed token.
//! 3. The source caches the token and only talks to the token endpoint when
//!    the cached token is stale.

mod client_credentials;
mod discovery;
mod exchange;
mod options;
mod refresh;
mod source;
mod token;

pub use client_credentials::ClientCredentialsSource;
pub use discovery::{ProviderMetadata, fetch_openid_configuration};
pub use exchange::{AuthStyle, TokenExchange};
pub use options::Options;
pub use refresh::RefreshTokenSource;
pub use source::{Strategy, TokenSource};
pub use token::{Token, TokenProvider};

use crate::error::ClientResult;

/// Discover the issuer's token endpoint and build the matching token source.
///
/// Nothing is exchanged here; the first token is fetched on first use.
pub async fn discover_token_source(
    http: &reqwest::Client,
    options: &Options,
    seed: Option<Token>,
) -> ClientResult<TokenSource> {
    let metadata = fetch_openid_configuration(http, &options.issuer_url).await?;
    let exchange = TokenExchange::new(http.clone(), options, &metadata)?;
    Ok(TokenSource::select(exchange, seed))
}
