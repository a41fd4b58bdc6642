use anyhow::{anyhow, Result};
use clap::Args;
use equityfeed_lib::{latest_open_prices, YahooBatchProvider};

use crate::output::{print_open_prices, OutputFormat};

#[derive(Args)]
pub struct LatestOpenArgs {
    /// Comma-separated tickers (default: every NYSE ticker)
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Only take the first N NYSE tickers when --tickers is not given
    #[arg(long)]
    pub nyse_limit: Option<usize>,

    /// Tickers per provider call
    #[arg(long, default_value = "100")]
    pub batch_size: usize,

    /// Concurrent chart requests per batch
    #[arg(long, default_value = "5")]
    pub concurrency: usize,
}

pub async fn run(args: &LatestOpenArgs, quiet: bool, format: &OutputFormat) -> Result<()> {
    let tickers = super::resolve_tickers(&args.tickers, args.nyse_limit).await?;
    let provider = YahooBatchProvider::new()
        .map_err(|e| anyhow!("Failed to create Yahoo client: {}", e))?
        .with_concurrency(args.concurrency);

    let observer = super::observer_for(quiet, tickers.len(), "Latest open");

    let today = chrono::Local::now().date_naive();
    let prices =
        latest_open_prices(&provider, &tickers, args.batch_size, today, observer.as_ref()).await?;

    eprintln!("{} opening prices", prices.len());
    print_open_prices(&prices, format)
}
