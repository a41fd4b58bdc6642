//! Yahoo Finance chart client for daily bars.
//!
//! Yahoo has no official API and no bulk endpoint that returns stable JSON,
//! so bulk downloads issue one chart request per symbol. Batching and
//! retries live a layer up.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;

use crate::client::{parse_url, truncate_body, HttpClient};
use crate::query::{ChartQuery, Query};
use crate::types::{ChartResponse, RawBar};
use crate::Error;

const PROVIDER: &str = "Yahoo Finance";

/// Request timeout for chart calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Yahoo Finance v8 chart API.
#[derive(Clone)]
pub struct YahooClient {
    http: HttpClient,
    /// Base URL for the API. Defaults to `https://query2.finance.yahoo.com`.
    base_url: String,
}

impl YahooClient {
    /// Creates a client pointing at the production chart API.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url("https://query2.finance.yahoo.com")
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(REQUEST_TIMEOUT)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches raw daily bars for `symbol` over the inclusive range `[start, end]`.
    ///
    /// Returns an empty vector when Yahoo knows the symbol but has no bars in
    /// the range, and [`Error::SymbolNotFound`] when it does not know it.
    pub async fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, Error> {
        let url = parse_url(&format!("{}/v8/finance/chart/{}", self.base_url, symbol))?;
        let url = ChartQuery::new(start, end).add_to_url(&url);

        let (status, body) = self.http.get_raw(url).await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("Yahoo throttled chart request for {}", symbol);
            return Err(Error::RateLimited {
                provider: PROVIDER.to_string(),
                symbol: symbol.to_string(),
                message: "HTTP 429".to_string(),
            });
        }

        // Unknown symbols come back as 404 with a chart error envelope
        if status == StatusCode::NOT_FOUND {
            return match serde_json::from_str::<ChartResponse>(&body) {
                Ok(chart) => chart.into_bars(symbol),
                Err(_) => Err(Error::SymbolNotFound(symbol.to_string())),
            };
        }

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Chart request for {} failed with status {}: {}", symbol, status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let chart = serde_json::from_str::<ChartResponse>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse chart for {}: {} | body: {}", symbol, e, snippet);
            Error::ParseFailed(format!("chart response for {}: {}", symbol, e))
        })?;

        chart.into_bars(symbol)
    }
}
