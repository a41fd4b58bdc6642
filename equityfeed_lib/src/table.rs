//! Normalized price rows and the final result table.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day for one ticker in the output shape.
///
/// Numeric fields are `None` when the provider value was missing or could
/// not be read as a number. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    pub adjusted_close: Option<f64>,
    pub provider_tag: String,
}

/// Final download result, ordered by `(ticker, date)` with one row per key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Collapses duplicate `(ticker, date)` keys, keeping the row produced
    /// last, and sorts ascending.
    pub fn from_rows(rows: impl IntoIterator<Item = PriceRow>) -> Self {
        let mut by_key: BTreeMap<(String, NaiveDate), PriceRow> = BTreeMap::new();
        for row in rows {
            by_key.insert((row.ticker.clone(), row.date), row);
        }
        Self {
            rows: by_key.into_values().collect(),
        }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct tickers in table order.
    pub fn tickers(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if out.last() != Some(&row.ticker.as_str()) {
                out.push(&row.ticker);
            }
        }
        out
    }

    /// Rows grouped per ticker, each group already date-ordered.
    pub fn by_ticker(&self) -> impl Iterator<Item = (&str, &[PriceRow])> {
        self.rows
            .chunk_by(|a, b| a.ticker == b.ticker)
            .map(|group| (group[0].ticker.as_str(), group))
    }
}
