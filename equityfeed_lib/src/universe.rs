//! Listed-security universe built from the NASDAQ Trader symbol directory.

use std::collections::HashSet;

use equityfeed_api::types::{DirectoryEntry, SecurityType};
use equityfeed_api::SymbolDirectoryClient;
use serde::Serialize;

use crate::error::DownloadError;

/// Exchange code of the New York Stock Exchange in `otherlisted.txt`.
pub const NYSE: &str = "N";

/// Longest symbol kept in the universe.
const MAX_TICKER_LEN: usize = 5;

/// One security of the universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedSecurity {
    pub ticker: String,
    pub company_name: String,
    pub security_type: SecurityType,
}

/// Filters, cleans and orders directory entries.
///
/// Symbols are trimmed and kept only if purely alphabetic and at most five
/// characters long (class shares such as `BRK.B` drop out). The first
/// occurrence of a ticker wins, the result is sorted by ticker, and `limit`
/// applies last.
pub fn select_securities(
    entries: &[DirectoryEntry],
    exchange: Option<&str>,
    security_type: Option<SecurityType>,
    limit: Option<usize>,
) -> Vec<ListedSecurity> {
    let mut seen = HashSet::new();
    let mut out: Vec<ListedSecurity> = entries
        .iter()
        .filter(|e| exchange.map_or(true, |x| e.exchange.trim() == x))
        .filter_map(|e| {
            let ticker = e.act_symbol.trim();
            let valid = !ticker.is_empty()
                && ticker.len() <= MAX_TICKER_LEN
                && ticker.chars().all(|c| c.is_ascii_alphabetic());
            valid.then(|| ListedSecurity {
                ticker: ticker.to_string(),
                company_name: e.security_name.trim().to_string(),
                security_type: e.security_type(),
            })
        })
        .filter(|s| seen.insert(s.ticker.clone()))
        .filter(|s| security_type.map_or(true, |t| s.security_type == t))
        .collect();

    out.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    if let Some(limit) = limit {
        out.truncate(limit);
    }
    out
}

/// Downloads the directory and returns the filtered universe.
pub async fn list_tickers(
    client: &SymbolDirectoryClient,
    exchange: Option<&str>,
    security_type: Option<SecurityType>,
    limit: Option<usize>,
) -> Result<Vec<ListedSecurity>, DownloadError> {
    let entries = client.fetch_other_listed().await?;
    let selected = select_securities(&entries, exchange, security_type, limit);
    tracing::debug!(
        "Symbol directory: {} entries, {} selected",
        entries.len(),
        selected.len()
    );
    Ok(selected)
}

/// NYSE tickers with company names.
pub async fn fetch_nyse_tickers_with_names(
    client: &SymbolDirectoryClient,
    limit: Option<usize>,
) -> Result<Vec<ListedSecurity>, DownloadError> {
    list_tickers(client, Some(NYSE), None, limit).await
}

/// NYSE ticker symbols only.
pub async fn fetch_nyse_tickers(
    client: &SymbolDirectoryClient,
    limit: Option<usize>,
) -> Result<Vec<String>, DownloadError> {
    Ok(fetch_nyse_tickers_with_names(client, limit)
        .await?
        .into_iter()
        .map(|s| s.ticker)
        .collect())
}
