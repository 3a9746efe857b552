//! Service Manager client
//!
//! An authenticated client for the Service Manager REST API. It resolves the
//! token issuer through OpenID discovery, obtains OAuth2 bearer tokens and
//! exposes CRUD operations over platforms, brokers, visibilities, service
//! offerings and plans.
//!
//! # Features
//!
//! - **Two token strategies**: client-credentials grant, or refresh-token
//!   grant when seeded with a refreshable token; chosen once per client
//! - **Token reuse**: tokens are cached until they expire and concurrent
//!   callers share a single renewal
//! - **Typed failures**: every non-success answer becomes a
//!   [`ResourceError`] carrying status, URL and the server's message
//!
//! # Example
//!
//! ```no_run
//! use sm_client::{client::ServiceManagerClient, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new("https://service-manager.example.com", "my-client", "my-secret");
//!     let client = ServiceManagerClient::connect(&config, None).await?;
//!
//!     let platforms = client.list_platforms(None).await?;
//!     println!("{} platforms", platforms.platforms.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod response;

pub use client::ServiceManagerClient;
pub use config::Config;
pub use error::{ClientError, ClientResult, ResourceError, TokenError};
pub use query::Parameters;
