//! Service Manager API client.
//!
//! Provides async HTTP client with:
//! - Two-phase construction: unauthenticated bootstrap, then bearer auth
//! - One TLS/timeout policy for discovery, token exchange and resource calls
//! - Uniform status handling through [`crate::response`]

mod middleware;

pub use middleware::BearerAuth;

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::{self, Options, Token, TokenProvider, TokenSource};
use crate::config::{Config, paths};
use crate::error::ClientResult;
use crate::models::{
    Broker, Brokers, Info, LabelChanges, Platform, Platforms, ServiceOfferings, ServicePlans,
    Visibilities, Visibility,
};
use crate::query::{Parameters, build_url};
use crate::response;

/// Build the HTTP client shared by every call of one Service Manager client.
pub fn build_http_client(config: &Config) -> ClientResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.ssl_disabled)
        .build()?;
    Ok(client)
}

/// Service Manager API client.
#[derive(Clone)]
pub struct ServiceManagerClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Service Manager base URL without trailing slash.
    base_url: String,

    /// Token source behind the bearer middleware, if authenticated.
    token_source: Option<Arc<TokenSource>>,
}

impl ServiceManagerClient {
    /// Connect to a Service Manager.
    ///
    /// Bootstraps without credentials (`/v1/info`, then OpenID discovery of
    /// the advertised issuer) and returns a client whose calls carry a
    /// bearer token. A `seed` token is reused while fresh; one with a
    /// refresh token makes the client renew tokens through the
    /// refresh-token grant.
    ///
    /// # Errors
    ///
    /// Returns error if the info call or discovery fails. No token is
    /// requested here.
    pub async fn connect(config: &Config, seed: Option<Token>) -> ClientResult<Self> {
        let http = build_http_client(config)?;

        let bootstrap = Self::from_parts(ClientBuilder::new(http.clone()).build(), &config.url, None);
        let info = bootstrap.get_info(None).await?;

        let options = Options::from_info(config, &info);
        let source = auth::discover_token_source(&http, &options, seed).await?;

        tracing::info!(
            url = %config.url,
            issuer = %options.issuer_url,
            strategy = ?source.strategy(),
            "Connected to Service Manager"
        );

        Ok(Self::authenticated(http, &config.url, Arc::new(source)))
    }

    /// Create a client that sends no credentials.
    pub fn unauthenticated(config: &Config) -> ClientResult<Self> {
        let http = build_http_client(config)?;
        Ok(Self::from_parts(ClientBuilder::new(http).build(), &config.url, None))
    }

    /// Create a client around an already built token source.
    pub fn with_token_source(config: &Config, source: TokenSource) -> ClientResult<Self> {
        let http = build_http_client(config)?;
        Ok(Self::authenticated(http, &config.url, Arc::new(source)))
    }

    fn authenticated(http: reqwest::Client, base_url: &str, source: Arc<TokenSource>) -> Self {
        let client = ClientBuilder::new(http).with(BearerAuth::new(source.clone())).build();
        Self::from_parts(client, base_url, Some(source))
    }

    fn from_parts(
        client: ClientWithMiddleware,
        base_url: &str,
        token_source: Option<Arc<TokenSource>>,
    ) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string(), token_source }
    }

    /// Check if calls carry a bearer token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token_source.is_some()
    }

    /// The current token, renewed first if stale. `None` when unauthenticated.
    pub async fn token(&self) -> ClientResult<Option<Token>> {
        match &self.token_source {
            Some(source) => Ok(Some(source.token().await?)),
            None => Ok(None),
        }
    }

    /// Get Service Manager info, including the token issuer.
    pub async fn get_info(&self, query: Option<&Parameters>) -> ClientResult<Info> {
        self.list(paths::INFO, query).await
    }

    // ---- platforms ----

    /// Register a platform.
    pub async fn register_platform(
        &self,
        platform: &Platform,
        query: Option<&Parameters>,
    ) -> ClientResult<Platform> {
        self.register(paths::PLATFORMS, platform, query).await
    }

    /// List platforms matching the query.
    pub async fn list_platforms(&self, query: Option<&Parameters>) -> ClientResult<Platforms> {
        self.list(paths::PLATFORMS, query).await
    }

    pub async fn update_platform(
        &self,
        id: &str,
        platform: &Platform,
        query: Option<&Parameters>,
    ) -> ClientResult<Platform> {
        self.update(paths::PLATFORMS, id, platform, query).await
    }

    /// Delete all platforms matching the query.
    pub async fn delete_platforms(&self, query: Option<&Parameters>) -> ClientResult<()> {
        self.delete(paths::PLATFORMS, query).await
    }

    pub async fn delete_platform(&self, id: &str, query: Option<&Parameters>) -> ClientResult<()> {
        self.delete(&format!("{}/{id}", paths::PLATFORMS), query).await
    }

    // ---- brokers ----

    /// Register a service broker.
    pub async fn register_broker(
        &self,
        broker: &Broker,
        query: Option<&Parameters>,
    ) -> ClientResult<Broker> {
        self.register(paths::SERVICE_BROKERS, broker, query).await
    }

    /// List brokers matching the query.
    pub async fn list_brokers(&self, query: Option<&Parameters>) -> ClientResult<Brokers> {
        self.list(paths::SERVICE_BROKERS, query).await
    }

    pub async fn update_broker(
        &self,
        id: &str,
        broker: &Broker,
        query: Option<&Parameters>,
    ) -> ClientResult<Broker> {
        self.update(paths::SERVICE_BROKERS, id, broker, query).await
    }

    /// Delete all brokers matching the query.
    pub async fn delete_brokers(&self, query: Option<&Parameters>) -> ClientResult<()> {
        self.delete(paths::SERVICE_BROKERS, query).await
    }

    pub async fn delete_broker(&self, id: &str, query: Option<&Parameters>) -> ClientResult<()> {
        self.delete(&format!("{}/{id}", paths::SERVICE_BROKERS), query).await
    }

    // ---- visibilities ----

    /// Register a visibility.
    pub async fn register_visibility(
        &self,
        visibility: &Visibility,
        query: Option<&Parameters>,
    ) -> ClientResult<Visibility> {
        self.register(paths::VISIBILITIES, visibility, query).await
    }

    pub async fn list_visibilities(
        &self,
        query: Option<&Parameters>,
    ) -> ClientResult<Visibilities> {
        self.list(paths::VISIBILITIES, query).await
    }

    pub async fn update_visibility(
        &self,
        id: &str,
        visibility: &Visibility,
        query: Option<&Parameters>,
    ) -> ClientResult<Visibility> {
        self.update(paths::VISIBILITIES, id, visibility, query).await
    }

    /// Delete all visibilities matching the query.
    pub async fn delete_visibilities(&self, query: Option<&Parameters>) -> ClientResult<()> {
        self.delete(paths::VISIBILITIES, query).await
    }

    pub async fn delete_visibility(&self, id: &str, query: Option<&Parameters>) -> ClientResult<()> {
        self.delete(&format!("{}/{id}", paths::VISIBILITIES), query).await
    }

    // ---- offerings and plans ----

    /// List service offerings with their plans and broker name.
    ///
    /// Issues one plans query and one broker lookup per offering. Only the
    /// general parameters of `query` are forwarded to those follow-up calls.
    pub async fn list_offerings(
        &self,
        query: Option<&Parameters>,
    ) -> ClientResult<ServiceOfferings> {
        let mut offerings: ServiceOfferings = self.list(paths::SERVICE_OFFERINGS, query).await?;
        let general = query.map(Parameters::general_only).unwrap_or_default();

        for offering in &mut offerings.service_offerings {
            let plans_query =
                general.clone().field(format!("service_offering_id = {}", offering.id));
            let broker_path = format!("{}/{}", paths::SERVICE_BROKERS, offering.broker_id);

            let (plans, broker) = futures::try_join!(
                self.list::<ServicePlans>(paths::SERVICE_PLANS, Some(&plans_query)),
                self.list::<Broker>(&broker_path, Some(&general)),
            )?;

            offering.plans = plans.service_plans;
            offering.broker_name = broker.name;
        }

        Ok(offerings)
    }

    pub async fn list_plans(&self, query: Option<&Parameters>) -> ClientResult<ServicePlans> {
        self.list(paths::SERVICE_PLANS, query).await
    }

    // ---- labels ----

    /// Apply label changes to the resource `id` under `path`.
    pub async fn label(
        &self,
        path: &str,
        id: &str,
        changes: &LabelChanges,
        query: Option<&Parameters>,
    ) -> ClientResult<()> {
        let url = self.url(&format!("{path}/{id}"), query);
        let response = self.send(Method::PATCH, &url, Some(changes)).await?;
        response::interpret_no_body(response, &url, StatusCode::OK).await
    }

    /// Make an arbitrary authenticated call.
    ///
    /// Meant for operations without a dedicated method. Non-2xx answers are
    /// returned as [`crate::error::ResourceError`].
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        query: Option<&Parameters>,
    ) -> ClientResult<Response> {
        let url = self.url(path, query);
        let response = self.send(method, &url, body).await?;
        Ok(response::ensure_success(response, &url).await?)
    }

    async fn register<T, R>(&self, path: &str, resource: &T, query: Option<&Parameters>) -> ClientResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path, query);
        let response = self.send(Method::POST, &url, Some(resource)).await?;
        response::interpret(response, &url, StatusCode::CREATED).await
    }

    async fn list<R>(&self, path: &str, query: Option<&Parameters>) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url(path, query);
        let response = self.send::<()>(Method::GET, &url, None).await?;
        response::interpret(response, &url, StatusCode::OK).await
    }

    async fn update<T, R>(
        &self,
        path: &str,
        id: &str,
        resource: &T,
        query: Option<&Parameters>,
    ) -> ClientResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(&format!("{path}/{id}"), query);
        let response = self.send(Method::PATCH, &url, Some(resource)).await?;
        response::interpret(response, &url, StatusCode::OK).await
    }

    async fn delete(&self, path: &str, query: Option<&Parameters>) -> ClientResult<()> {
        let url = self.url(path, query);
        let response = self.send::<()>(Method::DELETE, &url, None).await?;
        response::interpret_no_body(response, &url, StatusCode::OK).await
    }

    /// Full request URL for `path` with encoded query parameters.
    fn url(&self, path: &str, query: Option<&Parameters>) -> String {
        format!("{}{}", self.base_url, build_url(path, query))
    }

    /// Send a request to `url` and return the raw response.
    async fn send<B>(&self, method: Method, url: &str, body: Option<&B>) -> ClientResult<Response>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(method = %method, url = %url, "Calling Service Manager");

        let mut request = self.client.request(method, url).header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        Ok(request.send().await?)
    }
}

impl std::fmt::Debug for ServiceManagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceManagerClient")
            .field("base_url", &self.base_url)
            .field("strategy", &self.token_source.as_ref().map(|source| source.strategy()))
            .finish()
    }
}
