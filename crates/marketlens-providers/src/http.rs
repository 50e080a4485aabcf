//! Shared HTTP plumbing for provider clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

use marketlens_core::error::{AppError, ErrorKind};
use marketlens_core::result::AppResult;

/// Raw upstream reply.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Build the HTTP client shared by all providers.
pub fn build_http_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("marketlens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
        })
}

/// Join `base` and `path` and append query parameters, if any.
pub fn endpoint_url(base: &str, path: &str, params: &[(&str, &str)]) -> AppResult<Url> {
    let raw = format!("{}{path}", base.trim_end_matches('/'));
    let parsed = if params.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, params)
    };
    parsed.map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            format!("Invalid provider URL '{raw}'"),
            e,
        )
    })
}

/// The configured API key, or a configuration error naming the provider.
pub fn require_key<'a>(api_key: &'a Option<String>, provider: &str) -> AppResult<&'a str> {
    api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::configuration(format!("{provider} API key not configured.")))
}

/// Issue a GET and read the body, whatever the status.
///
/// Only the URL path is logged; query strings carry API keys.
pub async fn get_text(
    client: &Client,
    provider: &'static str,
    url: Url,
) -> AppResult<UpstreamResponse> {
    let path = url.path().to_string();
    debug!(provider, path = %path, "Calling upstream provider");
    send(client.get(url), provider, &path).await
}

/// POST a JSON body and read the reply, whatever the status.
pub async fn post_json<B: Serialize + ?Sized>(
    request: RequestBuilder,
    provider: &'static str,
    path: &str,
    body: &B,
) -> AppResult<UpstreamResponse> {
    debug!(provider, path, "Posting to upstream provider");
    send(request.json(body), provider, path).await
}

async fn send(
    request: RequestBuilder,
    provider: &'static str,
    path: &str,
) -> AppResult<UpstreamResponse> {
    let response = request.send().await.map_err(|e| {
        warn!(provider, path, error = %e, "Upstream request failed");
        let kind = if e.is_timeout() {
            ErrorKind::ServiceUnavailable
        } else {
            ErrorKind::ExternalService
        };
        AppError::with_source(kind, format!("Failed to reach {provider}"), e.without_url())
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("Failed to read {provider} response"),
            e.without_url(),
        )
    })?;

    Ok(UpstreamResponse { status, body })
}

/// Classify a non-success upstream status.
pub fn status_error(provider: &str, status: StatusCode, detail: Option<&str>) -> AppError {
    let reason = detail
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    if status == StatusCode::TOO_MANY_REQUESTS {
        AppError::rate_limit(format!("{provider} rate limit reached: {reason}"))
    } else {
        AppError::external_service(format!("Failed to fetch from {provider}: {reason}"))
    }
}

/// Decode a provider JSON body.
pub fn decode<T: serde::de::DeserializeOwned>(provider: &str, body: &str) -> AppResult<T> {
    serde_json::from_str(body).map_err(|e| {
        AppError::with_source(
            ErrorKind::ExternalService,
            format!("Malformed {provider} response"),
            e,
        )
    })
}
