use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One daily bar exactly as the provider sent it.
///
/// Price fields are left as raw JSON so that coercion happens in one place
/// downstream; a field may be a number, a string, or `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Value,
    pub high: Value,
    pub low: Value,
    pub close: Value,
    pub adj_close: Value,
    pub volume: Value,
}

impl RawBar {
    /// Builds a bar from plain numbers.
    pub fn from_values(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open: Value::from(open),
            high: Value::from(high),
            low: Value::from(low),
            close: Value::from(close),
            adj_close: Value::from(adj_close),
            volume: Value::from(volume),
        }
    }

    /// A bar with every field `null` (Yahoo emits these for holidays).
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            open: Value::Null,
            high: Value::Null,
            low: Value::Null,
            close: Value::Null,
            adj_close: Value::Null,
            volume: Value::Null,
        }
    }

    /// True when the provider sent nothing but `null` for this day.
    pub fn is_all_null(&self) -> bool {
        [
            &self.open,
            &self.high,
            &self.low,
            &self.close,
            &self.adj_close,
            &self.volume,
        ]
        .iter()
        .all(|v| v.is_null())
    }
}

/// One intraday bar from a single-symbol provider, already coerced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntradayBar {
    pub datetime: NaiveDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    pub symbol: String,
    pub provider: String,
}
