//! Yahoo Finance as a [`BatchQuoteProvider`].
//!
//! The chart API serves one symbol per request, so a batch fans out into
//! concurrent per-symbol requests (bounded by a semaphore, with a small
//! jittered delay before each) and the answers are folded back into a
//! single [`BatchResult`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use equityfeed_api::types::RawBar;
use equityfeed_api::{Error as ApiError, YahooClient};
use rand::Rng;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::batch::{BatchQuoteProvider, BatchResult, DateRange};
use crate::error::ProviderError;

/// Provider tag stamped on rows fetched from Yahoo.
pub const PROVIDER_TAG: &str = "yahoo";

const DEFAULT_CONCURRENCY: usize = 5;

/// Message sent from a fetch task back to the collector.
struct SymbolFetch {
    symbol: String,
    result: Result<Vec<RawBar>, ApiError>,
}

/// Batch adapter over [`YahooClient`].
pub struct YahooBatchProvider {
    client: Arc<YahooClient>,
    concurrency: usize,
    /// Jitter window in milliseconds slept before each request; `(0, 0)` disables it.
    request_delay_ms: (u64, u64),
}

impl YahooBatchProvider {
    /// Creates an adapter over the production chart API.
    pub fn new() -> Result<Self, ApiError> {
        Ok(Self::with_client(YahooClient::new()?))
    }

    pub fn with_client(client: YahooClient) -> Self {
        Self {
            client: Arc::new(client),
            concurrency: DEFAULT_CONCURRENCY,
            request_delay_ms: (200, 500),
        }
    }

    /// Maximum number of chart requests in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Random delay window before each request, in milliseconds.
    pub fn with_request_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.request_delay_ms = (min_ms, max_ms.max(min_ms));
        self
    }
}

#[async_trait]
impl BatchQuoteProvider for YahooBatchProvider {
    fn name(&self) -> &str {
        PROVIDER_TAG
    }

    async fn fetch(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<BatchResult, ProviderError> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::channel::<SymbolFetch>(self.concurrency * 2);
        let mut join_set = JoinSet::new();

        for symbol in symbols {
            let sem = Arc::clone(&semaphore);
            let sender = tx.clone();
            let client = Arc::clone(&self.client);
            let symbol = symbol.clone();
            let (min_ms, max_ms) = self.request_delay_ms;

            join_set.spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return;
                };
                if max_ms > 0 {
                    let delay_ms = rand::thread_rng().gen_range(min_ms..=max_ms);
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                let result = client.daily_bars(&symbol, range.start, range.end).await;
                let _ = sender.send(SymbolFetch { symbol, result }).await;
            });
        }
        drop(tx);

        let mut rows_by_ticker: BTreeMap<String, Vec<RawBar>> = BTreeMap::new();
        let mut transport_failures = 0usize;
        let mut last_error: Option<String> = None;

        while let Some(fetch) = rx.recv().await {
            match fetch.result {
                Ok(bars) => {
                    rows_by_ticker.insert(fetch.symbol, bars);
                }
                Err(ApiError::SymbolNotFound(_)) => {
                    // Answered, just empty: an all-null placeholder lets the
                    // ticker be confirmed as no-data instead of retried.
                    tracing::debug!("Yahoo does not know {}", fetch.symbol);
                    rows_by_ticker.insert(fetch.symbol, vec![RawBar::empty(range.start)]);
                }
                Err(err) if err.is_transient() => {
                    transport_failures += 1;
                    last_error = Some(err.to_string());
                }
                Err(err) => {
                    tracing::warn!("Chart request for {} failed: {}", fetch.symbol, err);
                }
            }
        }

        // Tasks that died without reporting count as transport failures.
        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Chart fetch task failed: {}", e);
                transport_failures += 1;
                last_error = Some(e.to_string());
            }
        }

        if rows_by_ticker.is_empty() && transport_failures > 0 {
            return Err(ProviderError::new(
                PROVIDER_TAG,
                symbols.len(),
                last_error.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }

        if symbols.len() == 1 {
            let rows = rows_by_ticker.into_values().next().unwrap_or_default();
            return Ok(BatchResult::SingleSymbol { rows });
        }

        Ok(BatchResult::MultiSymbol { rows_by_ticker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 2, 17).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(),
        )
        .unwrap()
    }

    fn chart_body(symbol: &str, close: f64) -> serde_json::Value {
        json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": symbol, "gmtoffset": -18000},
                    "timestamp": [1771338600],
                    "indicators": {
                        "quote": [{
                            "open": [close], "high": [close], "low": [close],
                            "close": [close], "volume": [100]
                        }],
                        "adjclose": [{"adjclose": [close]}]
                    }
                }],
                "error": null
            }
        })
    }

    fn not_found_body() -> serde_json::Value {
        json!({"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}})
    }

    fn provider(server: &MockServer) -> YahooBatchProvider {
        YahooBatchProvider::with_client(YahooClient::with_base_url(&server.uri()).unwrap())
            .with_request_delay(0, 0)
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn unknown_symbol_is_present_without_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL", 190.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/ZZZZ"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
            .mount(&server)
            .await;

        let result = provider(&server)
            .fetch(&symbols(&["AAPL", "ZZZZ"]), range())
            .await
            .unwrap();

        match result {
            BatchResult::MultiSymbol { rows_by_ticker } => {
                assert_eq!(rows_by_ticker.len(), 2);
                assert_eq!(rows_by_ticker["AAPL"].len(), 1);
                assert!(rows_by_ticker["ZZZZ"].iter().all(RawBar::is_all_null));
            }
            other => panic!("expected multi-symbol result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_single_symbol_is_not_an_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/ZZZZ"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
            .mount(&server)
            .await;

        let result = provider(&server)
            .fetch(&symbols(&["ZZZZ"]), range())
            .await
            .unwrap();
        assert!(!result.is_empty());
        let normalized = crate::normalize(&result, &symbols(&["ZZZZ"]), PROVIDER_TAG);
        assert_eq!(normalized.no_data, vec!["ZZZZ"]);
        assert!(normalized.unresolved.is_empty());
    }

    #[tokio::test]
    async fn delisted_symbol_is_confirmed_empty_not_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL", 190.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/DELISTED"))
            .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
            .mount(&server)
            .await;

        let config = crate::DownloadConfig {
            batch_size: 50,
            max_retries_per_ticker: 2,
            retry_backoff_seconds: 0.0,
            no_data_confirmations: 2,
            delay_seconds: 0.0,
        };
        let table = crate::download_history(
            &provider(&server),
            &symbols(&["AAPL", "DELISTED"]),
            range(),
            &config,
            &crate::NoopObserver,
        )
        .await
        .unwrap();
        assert_eq!(table.tickers(), vec!["AAPL"]);

        let delisted_calls = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/v8/finance/chart/DELISTED")
            .count();
        assert_eq!(delisted_calls, 2);
    }

    #[tokio::test]
    async fn single_symbol_batch_is_single_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/IBM"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("IBM", 250.0)))
            .mount(&server)
            .await;

        let result = provider(&server)
            .fetch(&symbols(&["IBM"]), range())
            .await
            .unwrap();
        assert!(matches!(result, BatchResult::SingleSymbol { ref rows } if rows.len() == 1));
    }

    #[tokio::test]
    async fn all_transport_failures_fail_the_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .fetch(&symbols(&["AAPL", "IBM"]), range())
            .await
            .unwrap_err();
        assert_eq!(err.provider, "yahoo");
        assert_eq!(err.batch_len, 2);
    }

    #[tokio::test]
    async fn partial_transport_failure_leaves_symbol_unresolved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL", 190.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/IBM"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = provider(&server)
            .fetch(&symbols(&["AAPL", "IBM"]), range())
            .await
            .unwrap();
        match result {
            BatchResult::MultiSymbol { rows_by_ticker } => {
                assert!(rows_by_ticker.contains_key("AAPL"));
                assert!(!rows_by_ticker.contains_key("IBM"));
            }
            other => panic!("expected multi-symbol result, got {:?}", other),
        }
    }
}
