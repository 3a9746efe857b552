//! OpenID Connect discovery: issuer URL -> `.well-known` -> token endpoint.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::api;
use crate::error::{ClientError, ClientResult};

/// Endpoints published by the OpenID provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    #[serde(default)]
    pub issuer: Option<String>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
}

/// Fetch `{issuer}/.well-known/openid-configuration`.
///
/// Any status other than `200 OK` fails discovery.
pub async fn fetch_openid_configuration(
    http: &reqwest::Client,
    issuer_url: &str,
) -> ClientResult<ProviderMetadata> {
    let url = format!("{}{}", issuer_url.trim_end_matches('/'), api::OPENID_CONFIGURATION);
    tracing::debug!(url = %url, "Fetching OpenID configuration");

    let response = http
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|err| ClientError::discovery(&url, err))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ClientError::discovery(&url, format!("unexpected status code {status}")));
    }

    let body = response.bytes().await.map_err(|err| ClientError::discovery(&url, err))?;
    let metadata: ProviderMetadata =
        serde_json::from_slice(&body).map_err(|err| ClientError::discovery(&url, err))?;

    tracing::debug!(token_endpoint = %metadata.token_endpoint, "Discovered token endpoint");
    Ok(metadata)
}
