//! Terminal progress bar for batched downloads.

use std::time::Duration;

use equityfeed_lib::backoff::format_duration;
use equityfeed_lib::{BatchStart, DownloadObserver, RoundReport};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives an indicatif bar over finalized tickers.
pub struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    pub fn new(total: usize, label: &str) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
            )
            .unwrap(),
        );
        bar.set_prefix(label.to_string());
        Self { bar }
    }
}

impl DownloadObserver for BarObserver {
    fn batch_started(&self, event: &BatchStart) {
        self.bar.set_length(event.total as u64);
        self.bar.set_message(format!(
            "batch {} | status=downloading | pending={}",
            event.batch_index, event.pending
        ));
    }

    fn round_finished(&self, report: &RoundReport) {
        self.bar.set_position(report.finalized as u64);
        let status = if report.batch_ok { "done" } else { "failed" };
        self.bar.set_message(format!(
            "batch {} | status={} | pending={} | ETA {}",
            report.batch_index,
            status,
            report.pending,
            format_duration(report.eta)
        ));
    }

    fn waiting(&self, delay: Duration, reason: &str) {
        if delay >= Duration::from_secs(1) {
            self.bar
                .println(format!("  {} {:.1}s", reason, delay.as_secs_f64()));
        }
    }

    fn finished(&self, finalized: usize, total: usize) {
        self.bar
            .finish_with_message(format!("{}/{} tickers finalized", finalized, total));
    }
}
