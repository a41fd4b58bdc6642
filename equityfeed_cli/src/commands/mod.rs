//! CLI subcommand implementations.

pub mod history;
pub mod intraday;
pub mod latest_open;
pub mod smoke_test;
pub mod tickers;

use std::io::IsTerminal;

use anyhow::{anyhow, Result};
use equityfeed_lib::equityfeed_api::SymbolDirectoryClient;
use equityfeed_lib::{DownloadObserver, LogObserver, NoopObserver};

use crate::progress::BarObserver;

/// Progress bar on a terminal, log lines when stderr is redirected.
pub(crate) fn observer_for(quiet: bool, total: usize, label: &str) -> Box<dyn DownloadObserver> {
    if quiet {
        Box::new(NoopObserver)
    } else if std::io::stderr().is_terminal() {
        Box::new(BarObserver::new(total, label))
    } else {
        Box::new(LogObserver)
    }
}

/// Explicit ticker list, or the NYSE universe when none was given.
pub(crate) async fn resolve_tickers(
    tickers: &[String],
    nyse_limit: Option<usize>,
) -> Result<Vec<String>> {
    let cleaned: Vec<String> = tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();
    if !cleaned.is_empty() {
        return Ok(cleaned);
    }

    let client = SymbolDirectoryClient::new()
        .map_err(|e| anyhow!("Failed to create symbol directory client: {}", e))?;
    let nyse = equityfeed_lib::fetch_nyse_tickers(&client, nyse_limit).await?;
    eprintln!("Loaded {} NYSE tickers from the symbol directory", nyse.len());
    Ok(nyse)
}
