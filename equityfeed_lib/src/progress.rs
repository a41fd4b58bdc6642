//! Progress reporting hooks for long downloads.
//!
//! The orchestrator reports through a [`DownloadObserver`]; what it reports
//! never influences control flow.

use std::time::Duration;

use crate::backoff::format_duration;

/// Snapshot taken right before a batch is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStart {
    /// 1-based batch number.
    pub batch_index: usize,
    pub batch_len: usize,
    /// Tickers still to be sent, including this batch.
    pub pending: usize,
    pub finalized: usize,
    pub total: usize,
    pub elapsed: Duration,
}

/// Snapshot taken after a batch has been accounted for.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub batch_index: usize,
    /// Tickers finalized by this round alone.
    pub newly_finalized: usize,
    pub finalized: usize,
    pub total: usize,
    pub pending: usize,
    /// False when the batch call itself failed.
    pub batch_ok: bool,
    pub elapsed: Duration,
    pub eta: Duration,
}

impl RoundReport {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.finalized as f64 / self.total as f64 * 100.0
    }
}

/// Receives progress events from a download.
pub trait DownloadObserver: Send + Sync {
    fn batch_started(&self, _event: &BatchStart) {}

    fn round_finished(&self, _report: &RoundReport) {}

    /// The orchestrator is about to sleep before the next batch.
    fn waiting(&self, _delay: Duration, _reason: &str) {}

    fn finished(&self, _finalized: usize, _total: usize) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DownloadObserver for NoopObserver {}

/// Writes progress lines through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl DownloadObserver for LogObserver {
    fn batch_started(&self, event: &BatchStart) {
        tracing::info!(
            "Starting batch {} ({} tickers) | finalized {}/{} | elapsed {}",
            event.batch_index,
            event.batch_len,
            event.finalized,
            event.total,
            format_duration(event.elapsed)
        );
    }

    fn round_finished(&self, report: &RoundReport) {
        tracing::info!(
            "[{}/{}] {:5.1}% complete | elapsed {} | ETA {}",
            report.finalized,
            report.total,
            report.percent(),
            format_duration(report.elapsed),
            format_duration(report.eta)
        );
    }

    fn waiting(&self, delay: Duration, reason: &str) {
        tracing::debug!("Sleeping {:.1}s ({})", delay.as_secs_f64(), reason);
    }
}
