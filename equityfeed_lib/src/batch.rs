//! The boundary between the orchestrator and a bulk quote source.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use equityfeed_api::types::RawBar;

use crate::error::{DownloadError, ProviderError};

/// Inclusive calendar date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DownloadError> {
        if start > end {
            return Err(DownloadError::Configuration(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parses two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, DownloadError> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                DownloadError::Configuration(format!("Invalid date '{}', expected YYYY-MM-DD", s))
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// What a provider returned for one batch.
///
/// The shape depends on how many symbols were requested: a single-symbol
/// answer carries no ticker keys and implicitly belongs to the one requested
/// ticker, while a multi-symbol answer is keyed by ticker and simply omits
/// tickers the provider could not resolve.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchResult {
    SingleSymbol { rows: Vec<RawBar> },
    MultiSymbol { rows_by_ticker: BTreeMap<String, Vec<RawBar>> },
}

impl BatchResult {
    /// Total number of rows across all tickers.
    pub fn row_count(&self) -> usize {
        match self {
            Self::SingleSymbol { rows } => rows.len(),
            Self::MultiSymbol { rows_by_ticker } => rows_by_ticker.values().map(Vec::len).sum(),
        }
    }

    /// True when the provider sent no rows at all.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

/// A source that can fetch daily bars for many symbols in one call.
#[async_trait]
pub trait BatchQuoteProvider: Send + Sync {
    /// Short tag stamped on every produced row (e.g. `yahoo`).
    fn name(&self) -> &str;

    /// Fetches daily bars for `symbols` over the inclusive range.
    ///
    /// An `Err` means the batch as a whole failed and is worth retrying;
    /// per-symbol problems are expressed through the shape of the result.
    async fn fetch(
        &self,
        symbols: &[String],
        range: DateRange,
    ) -> Result<BatchResult, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    #[test]
    fn range_rejects_inverted_dates() {
        assert!(DateRange::new(d(18), d(17)).is_err());
        assert!(DateRange::new(d(17), d(17)).is_ok());
    }

    #[test]
    fn range_parse_error_names_input() {
        let err = DateRange::parse("2026-02-30", "2026-03-01").unwrap_err();
        assert!(err.to_string().contains("2026-02-30"));
    }

    #[test]
    fn row_count_spans_all_tickers() {
        let mut map = BTreeMap::new();
        map.insert("AAPL".to_string(), vec![RawBar::empty(d(17))]);
        map.insert("IBM".to_string(), vec![]);
        let result = BatchResult::MultiSymbol {
            rows_by_ticker: map,
        };
        assert_eq!(result.row_count(), 1);
        assert!(!result.is_empty());

        let empty = BatchResult::MultiSymbol {
            rows_by_ticker: BTreeMap::new(),
        };
        assert!(empty.is_empty());
    }
}
