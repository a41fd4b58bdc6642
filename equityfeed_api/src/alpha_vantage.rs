//! Alpha Vantage client for single-symbol intraday bars and daily lookups.
//!
//! Alpha Vantage reports most failures with HTTP 200 and a payload field
//! instead of a status code: `Note` for throttling, `Information` for plan
//! or usage notices, `Error Message` for bad requests. Those are translated
//! into [`Error`] variants here so callers see one failure shape.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::client::{parse_datetime, parse_url, require_api_key, HttpClient, DEFAULT_TIMEOUT};
use crate::coerce::{coerce_f64, coerce_volume};
use crate::query::{AlphaVantageQuery, OutputSize, Query};
use crate::types::IntradayBar;
use crate::Error;

const PROVIDER: &str = "Alpha Vantage";

/// Provider tag stamped on every bar.
pub const PROVIDER_TAG: &str = "alpha_vantage";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Alpha Vantage REST client.
pub struct AlphaVantageClient {
    http: HttpClient,
    api_key: String,
    base_url: String,
}

impl AlphaVantageClient {
    /// Creates a client against the production API. The key falls back to
    /// `ALPHA_VANTAGE_API_KEY` when not given.
    pub fn new(api_key: Option<&str>) -> Result<Self, Error> {
        let api_key = require_api_key(api_key, API_KEY_ENV)?;
        Self::with_base_url("https://www.alphavantage.co", api_key)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(DEFAULT_TIMEOUT)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn query_series(&self, query: &AlphaVantageQuery) -> Result<Map<String, Value>, Error> {
        let url = parse_url(&format!("{}/query", self.base_url))?;
        let mut url = query.add_to_url(&url);
        url.query_pairs_mut().append_pair("apikey", &self.api_key);

        let symbol = query.symbol.as_str();
        let body = self.http.get_text(url, PROVIDER, symbol).await?;
        let data: Value = serde_json::from_str(&body).map_err(|e| {
            Error::ParseFailed(format!("Alpha Vantage response for {}: {}", symbol, e))
        })?;

        let field = |name: &str| data.get(name).map(payload_text);
        if let Some(message) = field("Information") {
            return Err(Error::ProviderInfo {
                provider: PROVIDER.to_string(),
                symbol: symbol.to_string(),
                message,
            });
        }
        if let Some(message) = field("Note") {
            return Err(Error::RateLimited {
                provider: PROVIDER.to_string(),
                symbol: symbol.to_string(),
                message,
            });
        }
        if let Some(message) = field("Error Message") {
            return Err(Error::ProviderMessage {
                provider: PROVIDER.to_string(),
                symbol: symbol.to_string(),
                message,
            });
        }

        match data.get(query.series_key()) {
            Some(Value::Object(series)) if !series.is_empty() => Ok(series.clone()),
            _ => Err(Error::ProviderMessage {
                provider: PROVIDER.to_string(),
                symbol: symbol.to_string(),
                message: "Unexpected response format".to_string(),
            }),
        }
    }

    /// Fetches intraday bars at `interval` (e.g. `5min`), sorted oldest first.
    pub async fn intraday(
        &self,
        symbol: &str,
        interval: &str,
        outputsize: OutputSize,
    ) -> Result<Vec<IntradayBar>, Error> {
        let series = self
            .query_series(&AlphaVantageQuery::intraday(symbol, interval, outputsize))
            .await?;

        let mut bars = Vec::with_capacity(series.len());
        for (stamp, payload) in &series {
            let datetime = parse_datetime(stamp).ok_or_else(|| {
                Error::ParseFailed(format!("invalid datetime '{}' for {}", stamp, symbol))
            })?;
            let get = |key: &str| payload.get(key).cloned().unwrap_or(Value::Null);
            bars.push(IntradayBar {
                datetime,
                open: coerce_f64(&get("1. open")),
                high: coerce_f64(&get("2. high")),
                low: coerce_f64(&get("3. low")),
                close: coerce_f64(&get("4. close")),
                volume: coerce_volume(&get("5. volume")),
                symbol: symbol.to_string(),
                provider: PROVIDER_TAG.to_string(),
            });
        }

        bars.sort_by_key(|b| b.datetime);
        Ok(bars)
    }

    /// Returns the most recent trading date in the compact daily series.
    pub async fn latest_daily_date(&self, symbol: &str) -> Result<NaiveDate, Error> {
        let series = self.query_series(&AlphaVantageQuery::daily(symbol)).await?;
        series
            .keys()
            .filter_map(|k| NaiveDate::parse_from_str(k, "%Y-%m-%d").ok())
            .max()
            .ok_or_else(|| Error::ParseFailed(format!("no dated entries for {}", symbol)))
    }
}

fn payload_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
