//! `equityfeed history`: bulk daily price download.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Args;
use equityfeed_lib::{
    download_history, output, ConfigOverrides, DateRange, DownloadConfig, YahooBatchProvider,
};

use crate::output::{print_prices, OutputFormat};

/// History download CLI arguments.
#[derive(Args)]
pub struct HistoryArgs {
    /// First day of the range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub start: String,

    /// Last day of the range (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub end: String,

    /// Comma-separated tickers (default: every NYSE ticker)
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Only take the first N NYSE tickers when --tickers is not given
    #[arg(long)]
    pub nyse_limit: Option<usize>,

    /// Tickers per provider call
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Retries per ticker after its first failure
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Base backoff in seconds (0 disables backoff)
    #[arg(long)]
    pub retry_backoff: Option<f64>,

    /// Consecutive empty answers needed to accept that a ticker has no data
    #[arg(long)]
    pub no_data_confirmations: Option<u32>,

    /// Pause in seconds between clean batches
    #[arg(long)]
    pub delay: Option<f64>,

    /// Concurrent chart requests per batch
    #[arg(long, default_value = "5")]
    pub concurrency: usize,

    /// Write the combined table to this CSV file
    #[arg(long)]
    pub combined_csv: Option<PathBuf>,

    /// Write one CSV per ticker into this directory
    #[arg(long)]
    pub individual_dir: Option<PathBuf>,
}

impl HistoryArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            batch_size: self.batch_size,
            max_retries_per_ticker: self.max_retries,
            retry_backoff_seconds: self.retry_backoff,
            no_data_confirmations: self.no_data_confirmations,
            delay_seconds: self.delay,
        }
    }
}

/// Run the history download.
pub async fn run(
    args: &HistoryArgs,
    config_path: Option<&Path>,
    quiet: bool,
    format: &OutputFormat,
) -> Result<()> {
    let range = DateRange::parse(&args.start, &args.end)?;
    let config = args.overrides().apply(DownloadConfig::layered(config_path)?);
    config.validate()?;

    let tickers = super::resolve_tickers(&args.tickers, args.nyse_limit).await?;

    let provider = YahooBatchProvider::new()
        .map_err(|e| anyhow!("Failed to create Yahoo client: {}", e))?
        .with_concurrency(args.concurrency);

    eprintln!(
        "Downloading {} ticker(s) for {} in batches of {}",
        tickers.len(),
        range,
        config.batch_size
    );

    let observer = super::observer_for(quiet, tickers.len(), "Historical download");

    let table = download_history(&provider, &tickers, range, &config, observer.as_ref()).await?;
    eprintln!(
        "Downloaded {} rows for {} ticker(s)",
        table.len(),
        table.tickers().len()
    );

    let mut wrote_files = false;
    if let Some(path) = &args.combined_csv {
        output::write_combined(&table, path)?;
        eprintln!("Wrote {}", path.display());
        wrote_files = true;
    }
    if let Some(dir) = &args.individual_dir {
        let written = output::write_per_ticker(&table, dir)?;
        eprintln!("Wrote {} files to {}", written.len(), dir.display());
        wrote_files = true;
    }

    if !wrote_files {
        print_prices(&table, format)?;
    }
    Ok(())
}
