//! Most recent session open price for many tickers.
//!
//! One pass over the ticker list in fixed batches, pulling the trailing week
//! of daily bars. Unlike [`download_history`](crate::history::download_history)
//! nothing is retried: a failed batch fails the call.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use equityfeed_api::coerce::coerce_f64;
use equityfeed_api::types::RawBar;
use serde::Serialize;
use tokio::time::Instant;

use crate::backoff::estimate_eta;
use crate::batch::{BatchQuoteProvider, BatchResult, DateRange};
use crate::error::DownloadError;
use crate::progress::{BatchStart, DownloadObserver, RoundReport};

/// Calendar days looked back from `today`; covers weekends and a holiday.
const LOOKBACK_DAYS: u64 = 6;

/// Open price of one ticker on its latest trading day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenPrice {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: f64,
    pub provider: String,
}

/// Fetches the latest open for each ticker and keeps only those on the
/// newest date seen across all of them.
pub async fn latest_open_prices<S: AsRef<str>>(
    provider: &dyn BatchQuoteProvider,
    tickers: &[S],
    batch_size: usize,
    today: NaiveDate,
    observer: &dyn DownloadObserver,
) -> Result<Vec<OpenPrice>, DownloadError> {
    if tickers.is_empty() {
        return Err(DownloadError::Configuration("No tickers to fetch".to_string()));
    }
    if batch_size < 1 {
        return Err(DownloadError::Configuration(
            "batch_size must be >= 1".to_string(),
        ));
    }

    let mut unique: Vec<String> = Vec::new();
    for ticker in tickers {
        let ticker = ticker.as_ref();
        if !unique.iter().any(|t| t == ticker) {
            unique.push(ticker.to_string());
        }
    }

    let start = today.checked_sub_days(Days::new(LOOKBACK_DAYS)).unwrap_or(today);
    let range = DateRange::new(start, today)?;
    let total = unique.len();
    let started = Instant::now();
    let mut completed = 0usize;
    let mut found: Vec<OpenPrice> = Vec::new();

    for (i, batch) in unique.chunks(batch_size).enumerate() {
        observer.batch_started(&BatchStart {
            batch_index: i + 1,
            batch_len: batch.len(),
            pending: total - completed,
            finalized: completed,
            total,
            elapsed: started.elapsed(),
        });

        let raw = provider.fetch(batch, range).await?;
        found.extend(extract_open_prices(&raw, batch, provider.name()));

        completed += batch.len();
        let elapsed = started.elapsed();
        observer.round_finished(&RoundReport {
            batch_index: i + 1,
            newly_finalized: batch.len(),
            finalized: completed,
            total,
            pending: total - completed,
            batch_ok: true,
            elapsed,
            eta: estimate_eta(elapsed, completed, total),
        });
    }
    observer.finished(completed, total);

    if found.is_empty() {
        return Err(DownloadError::NoOpenPrices {
            provider: provider.name().to_string(),
        });
    }

    let mut by_key: BTreeMap<(String, NaiveDate), OpenPrice> = BTreeMap::new();
    for price in found {
        by_key.insert((price.ticker.clone(), price.date), price);
    }
    let latest = by_key.keys().map(|(_, date)| *date).max();
    Ok(by_key
        .into_values()
        .filter(|p| Some(p.date) == latest)
        .collect())
}

/// Latest non-empty bar per ticker, kept only if its open is numeric.
fn extract_open_prices(raw: &BatchResult, batch: &[String], provider_tag: &str) -> Vec<OpenPrice> {
    let pick = |ticker: &str, rows: &[RawBar]| -> Option<OpenPrice> {
        let latest = rows
            .iter()
            .filter(|bar| !bar.is_all_null())
            .max_by_key(|bar| bar.date)?;
        Some(OpenPrice {
            date: latest.date,
            ticker: ticker.to_string(),
            open: coerce_f64(&latest.open)?,
            provider: provider_tag.to_string(),
        })
    };

    match raw {
        BatchResult::SingleSymbol { rows } => batch
            .first()
            .and_then(|ticker| pick(ticker, rows))
            .into_iter()
            .collect(),
        BatchResult::MultiSymbol { rows_by_ticker } => batch
            .iter()
            .filter_map(|ticker| {
                rows_by_ticker
                    .get(ticker)
                    .and_then(|rows| pick(ticker, rows))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::progress::NoopObserver;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    fn bar(day: u32, open: f64) -> RawBar {
        RawBar::from_values(d(day), open, open, open, open, open, 10)
    }

    /// Serves canned per-ticker bars and records every requested batch.
    struct CannedProvider {
        bars: BTreeMap<String, Vec<RawBar>>,
        batches: Mutex<Vec<Vec<String>>>,
        ranges: Mutex<Vec<DateRange>>,
    }

    impl CannedProvider {
        fn new(entries: Vec<(&str, Vec<RawBar>)>) -> Self {
            Self {
                bars: entries
                    .into_iter()
                    .map(|(t, b)| (t.to_string(), b))
                    .collect(),
                batches: Mutex::new(Vec::new()),
                ranges: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BatchQuoteProvider for CannedProvider {
        fn name(&self) -> &str {
            "yahoo"
        }

        async fn fetch(
            &self,
            symbols: &[String],
            range: DateRange,
        ) -> Result<BatchResult, ProviderError> {
            self.batches.lock().unwrap().push(symbols.to_vec());
            self.ranges.lock().unwrap().push(range);
            let rows_by_ticker = symbols
                .iter()
                .filter_map(|s| self.bars.get(s).map(|b| (s.clone(), b.clone())))
                .collect();
            Ok(BatchResult::MultiSymbol { rows_by_ticker })
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl BatchQuoteProvider for FailingProvider {
        fn name(&self) -> &str {
            "yahoo"
        }

        async fn fetch(
            &self,
            symbols: &[String],
            _range: DateRange,
        ) -> Result<BatchResult, ProviderError> {
            Err(ProviderError::new("yahoo", symbols.len(), "Request failed"))
        }
    }

    #[tokio::test]
    async fn keeps_only_rows_on_latest_date() {
        let provider = CannedProvider::new(vec![
            ("AAPL", vec![bar(17, 189.0), bar(18, 190.0)]),
            ("IBM", vec![bar(16, 248.0), bar(17, 249.0)]),
            ("MSFT", vec![bar(18, 410.0)]),
        ]);
        let prices = latest_open_prices(
            &provider,
            &["MSFT", "AAPL", "IBM", "AAPL"],
            2,
            d(18),
            &NoopObserver,
        )
        .await
        .unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].ticker, "AAPL");
        assert_eq!(prices[0].open, 190.0);
        assert_eq!(prices[1].ticker, "MSFT");
        assert!(prices.iter().all(|p| p.date == d(18) && p.provider == "yahoo"));

        let batches = provider.batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0], vec!["MSFT", "AAPL"]);
        assert_eq!(batches[1], vec!["IBM"]);
        let ranges = provider.ranges.lock().unwrap();
        assert_eq!(ranges[0].start, d(12));
        assert_eq!(ranges[0].end, d(18));
    }

    #[tokio::test]
    async fn latest_bar_without_open_is_skipped() {
        let mut no_open = bar(18, 0.0);
        no_open.open = json!(null);
        let provider = CannedProvider::new(vec![
            ("AAPL", vec![bar(17, 189.0), no_open]),
            ("IBM", vec![bar(17, 249.0), RawBar::empty(d(18))]),
        ]);
        let prices = latest_open_prices(&provider, &["AAPL", "IBM"], 10, d(18), &NoopObserver)
            .await
            .unwrap();

        // AAPL's newest bar has no open, IBM's newest non-empty bar is the 17th
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].ticker, "IBM");
        assert_eq!(prices[0].date, d(17));
    }

    #[tokio::test]
    async fn nothing_found_is_an_error() {
        let provider = CannedProvider::new(vec![]);
        let err = latest_open_prices(&provider, &["ZZZZ"], 10, d(18), &NoopObserver)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No opening prices returned from yahoo");
    }

    #[tokio::test]
    async fn batch_failure_propagates() {
        let err = latest_open_prices(&FailingProvider, &["AAPL"], 10, d(18), &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Provider(_)));
    }

    #[tokio::test]
    async fn argument_validation() {
        let provider = CannedProvider::new(vec![]);
        let empty: Vec<String> = Vec::new();
        let err = latest_open_prices(&provider, &empty, 10, d(18), &NoopObserver)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No tickers to fetch");

        let err = latest_open_prices(&provider, &["AAPL"], 0, d(18), &NoopObserver)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "batch_size must be >= 1");
    }
}
