use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use super::RawBar;
use crate::Error;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartResult,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<String>,
    /// Exchange offset from UTC in seconds; bar timestamps are session opens.
    #[serde(default)]
    pub gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub meta: Option<ChartMeta>,
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteData>,
    #[serde(default)]
    pub adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteData {
    #[serde(default)]
    pub open: Vec<Value>,
    #[serde(default)]
    pub high: Vec<Value>,
    #[serde(default)]
    pub low: Vec<Value>,
    #[serde(default)]
    pub close: Vec<Value>,
    #[serde(default)]
    pub volume: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct AdjCloseData {
    #[serde(default)]
    pub adjclose: Vec<Value>,
}

fn at(values: &[Value], i: usize) -> Value {
    values.get(i).cloned().unwrap_or(Value::Null)
}

impl ChartResponse {
    /// Unwraps the envelope into raw daily bars for `symbol`.
    ///
    /// A result without timestamps is a valid "no rows" answer and yields an
    /// empty vector; a `Not Found` chart error means Yahoo does not know the
    /// symbol.
    pub fn into_bars(self, symbol: &str) -> Result<Vec<RawBar>, Error> {
        let data = match self.chart.result {
            Some(results) => results.into_iter().next(),
            None => None,
        };
        let data = match data {
            Some(data) => data,
            None => {
                return Err(match self.chart.error {
                    Some(err) if err.code == "Not Found" => {
                        Error::SymbolNotFound(symbol.to_string())
                    }
                    Some(err) => Error::ProviderMessage {
                        provider: "Yahoo Finance".to_string(),
                        symbol: symbol.to_string(),
                        message: format!(
                            "{}: {}",
                            err.code,
                            err.description.unwrap_or_default()
                        ),
                    },
                    None => Error::ParseFailed("chart result is empty".to_string()),
                })
            }
        };

        let timestamps = match data.timestamp {
            Some(ts) => ts,
            None => return Ok(Vec::new()),
        };
        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();
        let adj = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose)
            .unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date: NaiveDate = ts
                .checked_add(offset)
                .and_then(|local| DateTime::from_timestamp(local, 0))
                .map(|dt| dt.date_naive())
                .ok_or_else(|| Error::ParseFailed(format!("invalid timestamp: {}", ts)))?;
            bars.push(RawBar {
                date,
                open: at(&quote.open, i),
                high: at(&quote.high, i),
                low: at(&quote.low, i),
                close: at(&quote.close, i),
                adj_close: at(&adj, i),
                volume: at(&quote.volume, i),
            });
        }
        Ok(bars)
    }
}
