//! Batched, retrying bulk download of daily price history.
//!
//! Tickers move through a FIFO queue in batches. Each batch answer sorts its
//! tickers into succeeded, no-data and unresolved; retryable tickers go to the
//! back of the queue with their counters bumped, and the loop sleeps with
//! exponential backoff whenever a round produced retries. The run ends when
//! the queue drains: every ticker is then either succeeded, confirmed empty,
//! or permanently failed.

use std::time::Duration;

use tokio::time::Instant;

use crate::backoff::{backoff_delay, estimate_eta};
use crate::batch::{BatchQuoteProvider, DateRange};
use crate::config::DownloadConfig;
use crate::error::DownloadError;
use crate::normalize::normalize;
use crate::progress::{BatchStart, DownloadObserver, RoundReport};
use crate::state::{Outcome, WorkState};
use crate::table::{PriceRow, PriceTable};

/// Downloads daily bars for `tickers` over `range`.
///
/// Duplicate tickers are fetched once. Fails with
/// [`DownloadError::DownloadFailure`] if any ticker exhausted its retries and
/// with [`DownloadError::NoData`] if the run finished without a single row.
pub async fn download_history<S: AsRef<str>>(
    provider: &dyn BatchQuoteProvider,
    tickers: &[S],
    range: DateRange,
    config: &DownloadConfig,
    observer: &dyn DownloadObserver,
) -> Result<PriceTable, DownloadError> {
    if tickers.is_empty() {
        return Err(DownloadError::Configuration(
            "No tickers to download".to_string(),
        ));
    }
    config.validate()?;

    let mut state = WorkState::new(
        tickers,
        config.max_retries_per_ticker,
        config.no_data_confirmations,
    );
    let started = Instant::now();
    let mut rows: Vec<PriceRow> = Vec::new();
    let mut batch_index = 0usize;

    tracing::debug!(
        "Downloading {} ticker(s) from {} for {} in batches of {}",
        state.total(),
        provider.name(),
        range,
        config.batch_size
    );

    while !state.is_done() {
        batch_index += 1;
        let batch = state.next_batch(config.batch_size);
        let finalized_before = state.finalized();

        observer.batch_started(&BatchStart {
            batch_index,
            batch_len: batch.len(),
            pending: state.pending() + batch.len(),
            finalized: finalized_before,
            total: state.total(),
            elapsed: started.elapsed(),
        });

        let raw = match provider.fetch(&batch, range).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("Batch {} failed, will retry: {}", batch_index, err);
                let mut max_attempt = 0u32;
                for ticker in &batch {
                    state.record_transport_failure(ticker);
                    max_attempt = max_attempt.max(attempt_count(&state, ticker));
                }
                report_round(observer, &state, batch_index, finalized_before, false, started);
                if config.retry_backoff_seconds > 0.0 {
                    pause(
                        observer,
                        backoff_delay(config.retry_backoff_seconds, max_attempt),
                        "batch failure backoff",
                    )
                    .await;
                }
                continue;
            }
        };

        let normalized = normalize(&raw, &batch, provider.name());
        rows.extend(normalized.rows);

        for ticker in &normalized.succeeded {
            state.record_success(ticker);
        }

        let mut max_attempt = 0u32;
        let mut no_data_retries = 0usize;
        for ticker in &normalized.no_data {
            if let Outcome::Requeued(count) = state.record_no_data(ticker) {
                no_data_retries += 1;
                max_attempt = max_attempt.max(count);
            }
        }

        for ticker in &normalized.unresolved {
            state.record_unresolved(ticker);
            max_attempt = max_attempt.max(attempt_count(&state, ticker));
        }

        tracing::debug!(
            "Batch {}: {} succeeded, {} no data ({} to confirm), {} unresolved",
            batch_index,
            normalized.succeeded.len(),
            normalized.no_data.len(),
            no_data_retries,
            normalized.unresolved.len()
        );
        if !normalized.unresolved.is_empty() {
            tracing::warn!(
                "Batch {}: {} ticker(s) missing from response",
                batch_index,
                normalized.unresolved.len()
            );
        }

        report_round(observer, &state, batch_index, finalized_before, true, started);

        let needs_backoff = !normalized.unresolved.is_empty() || no_data_retries > 0;
        if config.retry_backoff_seconds > 0.0 && needs_backoff {
            pause(
                observer,
                backoff_delay(config.retry_backoff_seconds, max_attempt),
                "retry backoff",
            )
            .await;
        } else if config.delay_seconds > 0.0 && !state.is_done() {
            pause(
                observer,
                Duration::from_secs_f64(config.delay_seconds),
                "batch delay",
            )
            .await;
        }
    }

    observer.finished(state.finalized(), state.total());

    let failed = state.failed();
    if !failed.is_empty() {
        tracing::error!("{} ticker(s) failed after retries", failed.len());
        return Err(DownloadError::download_failure(&failed));
    }

    if rows.is_empty() {
        return Err(DownloadError::NoData {
            provider: provider.name().to_string(),
        });
    }

    Ok(PriceTable::from_rows(rows))
}

fn attempt_count(state: &WorkState, ticker: &str) -> u32 {
    state.get(ticker).map(|s| s.attempt_count).unwrap_or(0)
}

fn report_round(
    observer: &dyn DownloadObserver,
    state: &WorkState,
    batch_index: usize,
    finalized_before: usize,
    batch_ok: bool,
    started: Instant,
) {
    let elapsed = started.elapsed();
    observer.round_finished(&RoundReport {
        batch_index,
        newly_finalized: state.finalized() - finalized_before,
        finalized: state.finalized(),
        total: state.total(),
        pending: state.pending(),
        batch_ok,
        elapsed,
        eta: estimate_eta(elapsed, state.finalized(), state.total()),
    });
}

async fn pause(observer: &dyn DownloadObserver, delay: Duration, reason: &str) {
    if delay.is_zero() {
        return;
    }
    observer.waiting(delay, reason);
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchResult;
    use crate::error::ProviderError;
    use crate::progress::NoopObserver;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BatchQuoteProvider for CountingProvider {
        fn name(&self) -> &str {
            "test"
        }

        async fn fetch(
            &self,
            _symbols: &[String],
            _range: DateRange,
        ) -> Result<BatchResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BatchResult::SingleSymbol { rows: vec![] })
        }
    }

    fn range() -> DateRange {
        let d = NaiveDate::from_ymd_opt(2026, 2, 17).unwrap();
        DateRange::new(d, d).unwrap()
    }

    #[tokio::test]
    async fn empty_ticker_list_is_configuration_error() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let tickers: Vec<String> = Vec::new();
        let err = download_history(
            &provider,
            &tickers,
            range(),
            &DownloadConfig::default(),
            &NoopObserver,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "No tickers to download");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_config_fails_before_any_call() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let config = DownloadConfig {
            batch_size: 0,
            ..Default::default()
        };
        let err = download_history(&provider, &["AAPL"], range(), &config, &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Configuration(ref m) if m == "batch_size must be >= 1"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_delay_is_rejected_not_slept() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let config = DownloadConfig {
            batch_size: 1,
            delay_seconds: 1e20,
            ..Default::default()
        };
        let err = download_history(&provider, &["AAPL", "IBM"], range(), &config, &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Configuration(ref m) if m == "delay_seconds is too large"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn always_empty_response_fails_after_budget() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let config = DownloadConfig {
            max_retries_per_ticker: 2,
            ..Default::default()
        };
        let err = download_history(&provider, &["ZZZZ"], range(), &config, &NoopObserver)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to download 1 ticker(s) after retries: ZZZZ"
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }
}
