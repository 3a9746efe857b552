//! Middleware for the HTTP client (bearer authentication).
//!
//! Composed with the reqwest client through `reqwest-middleware`.

use std::sync::Arc;

use http::Extensions;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};

use crate::auth::TokenProvider;

/// Attaches the current token of a [`TokenProvider`] to every request.
///
/// Token errors are handed to the caller as middleware errors wrapping
/// [`crate::error::TokenError`]; status codes are not interpreted here.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    provider: Arc<dyn TokenProvider>,
}

impl BearerAuth {
    #[must_use]
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Middleware for BearerAuth {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let token = self.provider.token().await.map_err(reqwest_middleware::Error::middleware)?;

        let mut value = HeaderValue::from_str(&token.authorization())
            .map_err(reqwest_middleware::Error::middleware)?;
        value.set_sensitive(true);
        req.headers_mut().insert(AUTHORIZATION, value);

        next.run(req, extensions).await
    }
}
