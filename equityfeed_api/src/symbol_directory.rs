//! NASDAQ Trader symbol directory (`otherlisted.txt`).
//!
//! The file lists every non-NASDAQ exchange-listed security as pipe-delimited
//! text with a header row and a trailing `File Creation Time` line.

use std::time::Duration;

use crate::client::{parse_url, HttpClient};
use crate::types::DirectoryEntry;
use crate::Error;

const PROVIDER: &str = "NASDAQ Trader";
const OTHER_LISTED_PATH: &str = "/dynamic/SymDir/otherlisted.txt";

/// Client for the public NASDAQ Trader symbol directory.
pub struct SymbolDirectoryClient {
    http: HttpClient,
    base_url: String,
}

impl SymbolDirectoryClient {
    /// Creates a client pointing at `https://www.nasdaqtrader.com`.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url("https://www.nasdaqtrader.com")
    }

    /// Creates a client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http: HttpClient::new(Duration::from_secs(20))?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Downloads and parses the `otherlisted.txt` directory.
    pub async fn fetch_other_listed(&self) -> Result<Vec<DirectoryEntry>, Error> {
        let url = parse_url(&format!("{}{}", self.base_url, OTHER_LISTED_PATH))?;
        let body = self.http.get_text(url, PROVIDER, "otherlisted.txt").await?;
        parse_other_listed(&body)
    }
}

/// Parses the pipe-delimited directory text.
///
/// Rows missing a symbol or exchange (including the footer line) are skipped;
/// a missing required header column is a parse error.
pub fn parse_other_listed(text: &str) -> Result<Vec<DirectoryEntry>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| Error::ParseFailed(format!("symbol directory header: {}", e)))?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::ParseFailed(format!("symbol directory missing column '{}'", name)))
    };
    let symbol_col = column("ACT Symbol")?;
    let name_col = column("Security Name")?;
    let exchange_col = column("Exchange")?;
    let etf_col = headers.iter().position(|h| h.trim() == "ETF");
    let test_col = headers.iter().position(|h| h.trim() == "Test Issue");

    let mut entries = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::ParseFailed(format!("symbol directory row: {}", e)))?;
        let (Some(symbol), Some(exchange)) = (record.get(symbol_col), record.get(exchange_col))
        else {
            continue;
        };
        if symbol.trim().is_empty() || exchange.trim().is_empty() {
            continue;
        }
        let flag = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .map(|v| v.trim().eq_ignore_ascii_case("Y"))
                .unwrap_or(false)
        };
        entries.push(DirectoryEntry {
            act_symbol: symbol.trim().to_string(),
            security_name: record.get(name_col).unwrap_or_default().trim().to_string(),
            exchange: exchange.trim().to_string(),
            is_etf: flag(etf_col),
            test_issue: flag(test_col),
        });
    }
    Ok(entries)
}
