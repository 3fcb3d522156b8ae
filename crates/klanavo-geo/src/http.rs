//! Plumbing shared by the provider clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::GeoError;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, GeoError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Parses `base_url`, normalised to end in exactly one slash so that
/// `Url::join` appends to it instead of replacing the last segment.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, GeoError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

pub(crate) fn join(base: &Url, endpoint: &str) -> Result<Url, GeoError> {
    base.join(endpoint).map_err(|e| GeoError::InvalidBaseUrl {
        base_url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Sends `request`, requires a 2xx status and decodes the body as `T`.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
    context: &str,
) -> Result<T, GeoError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(GeoError::UnexpectedStatus {
            provider,
            status: status.as_u16(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
        context: format!("{provider} {context}"),
        source: e,
    })
}
