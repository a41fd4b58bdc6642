//! Twelve Data client for single-symbol intraday bars.

use serde::Deserialize;
use serde_json::Value;

use crate::client::{parse_datetime, parse_url, require_api_key, HttpClient, DEFAULT_TIMEOUT};
use crate::coerce::{coerce_f64, coerce_volume};
use crate::query::{Query, TimeSeriesQuery};
use crate::types::IntradayBar;
use crate::Error;

const PROVIDER: &str = "Twelve Data";

/// Provider tag stamped on every bar.
pub const PROVIDER_TAG: &str = "twelve_data";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "TWELVE_DATA_API_KEY";

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    values: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesValue {
    datetime: String,
    #[serde(default)]
    open: Value,
    #[serde(default)]
    high: Value,
    #[serde(default)]
    low: Value,
    #[serde(default)]
    close: Value,
    #[serde(default)]
    volume: Value,
}

/// Twelve Data REST client.
pub struct TwelveDataClient {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

impl TwelveDataClient {
    /// Creates a client against the production API. The key falls back to
    /// `TWELVE_DATA_API_KEY` when not given.
    pub fn new(api_key: Option<&str>) -> Result<Self, Error> {
        let api_key = require_api_key(api_key, API_KEY_ENV)?;
        Self::with_base_url("https://api.twelvedata.com", api_key)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(DEFAULT_TIMEOUT)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches up to `outputsize` bars at `interval` (e.g. `5min`, `1day`),
    /// sorted oldest first.
    pub async fn time_series(
        &self,
        symbol: &str,
        interval: &str,
        outputsize: u32,
    ) -> Result<Vec<IntradayBar>, Error> {
        let url = parse_url(&format!("{}/time_series", self.base_url))?;
        let mut url = TimeSeriesQuery::new(symbol, interval, outputsize).add_to_url(&url);
        url.query_pairs_mut().append_pair("apikey", &self.api_key);

        let body = self.http.get_text(url, PROVIDER, symbol).await?;
        let resp: TimeSeriesResponse = serde_json::from_str(&body)
            .map_err(|e| Error::ParseFailed(format!("Twelve Data response for {}: {}", symbol, e)))?;

        let fail = |message: Option<String>| Error::ProviderMessage {
            provider: PROVIDER.to_string(),
            symbol: symbol.to_string(),
            message: message.unwrap_or_else(|| "Unexpected response format".to_string()),
        };

        let values = match resp.values {
            Some(Value::Array(values)) if !values.is_empty() => values,
            _ => return Err(fail(resp.message)),
        };

        let mut bars = Vec::with_capacity(values.len());
        for value in values {
            let row: TimeSeriesValue = serde_json::from_value(value).map_err(|e| {
                Error::ParseFailed(format!("Twelve Data value for {}: {}", symbol, e))
            })?;
            let datetime = parse_datetime(&row.datetime).ok_or_else(|| {
                Error::ParseFailed(format!("invalid datetime '{}' for {}", row.datetime, symbol))
            })?;
            bars.push(IntradayBar {
                datetime,
                open: coerce_f64(&row.open),
                high: coerce_f64(&row.high),
                low: coerce_f64(&row.low),
                close: coerce_f64(&row.close),
                volume: coerce_volume(&row.volume),
                symbol: symbol.to_string(),
                provider: PROVIDER_TAG.to_string(),
            });
        }

        bars.sort_by_key(|b| b.datetime);
        Ok(bars)
    }
}
