//! Shared HTTP plumbing for the provider clients.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::StatusCode;
use url::Url;

use crate::{user_agent::get_user_agent, Error};

/// Default request timeout for keyed JSON providers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Thin wrapper over a pooled `reqwest::Client` with a browser user agent.
#[derive(Clone)]
pub(crate) struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub(crate) fn new(timeout: Duration) -> Result<Self, Error> {
        let inner = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self { inner })
    }

    /// Sends a GET and returns the status with the full body, whatever the status.
    pub(crate) async fn get_raw(&self, url: Url) -> Result<(StatusCode, String), Error> {
        let resp = self
            .inner
            .get(url)
            .header("accept", "application/json, text/plain, */*")
            .header("accept-language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;
        Ok((status, body))
    }

    /// Sends a GET and returns the body of a successful response.
    ///
    /// HTTP 429 maps to [`Error::RateLimited`]; any other non-success status
    /// maps to [`Error::HttpStatus`] with a truncated body.
    pub(crate) async fn get_text(
        &self,
        url: Url,
        provider: &str,
        symbol: &str,
    ) -> Result<String, Error> {
        let (status, body) = self.get_raw(url).await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("{} throttled request for {}", provider, symbol);
            return Err(Error::RateLimited {
                provider: provider.to_string(),
                symbol: symbol.to_string(),
                message: "HTTP 429".to_string(),
            });
        }

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body)
    }
}

pub(crate) fn parse_url(raw: &str) -> Result<Url, Error> {
    Url::parse(raw).map_err(|e| {
        tracing::error!("Invalid URL constructed: {}", e);
        Error::RequestFailed
    })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

/// Parses provider timestamps: `YYYY-MM-DD HH:MM:SS`, or a bare date at midnight.
pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// Returns the explicit key if given, otherwise reads `env_name`.
pub fn require_api_key(provided: Option<&str>, env_name: &str) -> Result<String, Error> {
    if let Some(key) = provided.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }
    match std::env::var(env_name) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(Error::MissingApiKey(env_name.to_string())),
    }
}
