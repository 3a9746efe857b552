//! Turns raw API responses into decoded values or [`ResourceError`]s.
//!
//! Every client operation goes through these functions; callers never look
//! at status codes themselves. Errors carry the URL the request was sent
//! to, which differs from `Response::url` once redirects were followed.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult, ResourceError};

/// Pass 2xx responses through; turn anything else into a [`ResourceError`].
///
/// The `error` and `description` string fields of a JSON object body are
/// copied into the error when present. A body that cannot be read or
/// decoded still yields an error with status and URL.
pub async fn ensure_success(response: Response, url: &str) -> Result<Response, ResourceError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(resource_error(response, url).await)
}

/// Build a [`ResourceError`] for the request to `url`, consuming the response body.
pub async fn resource_error(response: Response, url: &str) -> ResourceError {
    let mut err = ResourceError::new(response.status(), url);

    let body = response.bytes().await.unwrap_or_default();
    if let Ok(content) = serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&body)
    {
        err.error = content.get("error").and_then(|v| v.as_str()).map(str::to_string);
        err.description = content.get("description").and_then(|v| v.as_str()).map(str::to_string);
    }

    tracing::debug!(
        status = err.status,
        url = %err.url,
        error = ?err.error,
        "Service Manager call failed"
    );
    err
}

/// Check for the `expected` status and decode the body as `T`.
pub async fn interpret<T>(response: Response, url: &str, expected: StatusCode) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    let response = expect_status(response, url, expected).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(ClientError::from)
}

/// Check for the `expected` status, ignoring the body.
pub async fn interpret_no_body(
    response: Response,
    url: &str,
    expected: StatusCode,
) -> ClientResult<()> {
    expect_status(response, url, expected).await?;
    Ok(())
}

async fn expect_status(
    response: Response,
    url: &str,
    expected: StatusCode,
) -> Result<Response, ResourceError> {
    let response = ensure_success(response, url).await?;
    if response.status() != expected {
        tracing::debug!(status = %response.status(), expected = %expected, "Unexpected success status");
        return Err(ResourceError::new(response.status(), url));
    }
    Ok(response)
}
