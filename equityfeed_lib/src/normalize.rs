//! Turns one raw batch response into output rows plus a per-ticker verdict.

use equityfeed_api::coerce::{coerce_f64, coerce_volume};
use equityfeed_api::types::RawBar;

use crate::batch::BatchResult;
use crate::table::PriceRow;

/// Classification of every requested ticker after one batch.
///
/// Each requested ticker appears in exactly one of the three lists, in
/// request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub rows: Vec<PriceRow>,
    /// At least one row with a value.
    pub succeeded: Vec<String>,
    /// Present in the response, but every row was empty.
    pub no_data: Vec<String>,
    /// Absent from the response altogether.
    pub unresolved: Vec<String>,
}

/// Classifies `requested` against `raw` and emits rows tagged `provider_tag`.
///
/// A response with no rows at all says nothing about any ticker, so every
/// requested ticker is unresolved. Rows whose fields are all null are dropped.
pub fn normalize(raw: &BatchResult, requested: &[String], provider_tag: &str) -> Normalized {
    let mut out = Normalized::default();

    if raw.is_empty() {
        out.unresolved = requested.to_vec();
        return out;
    }

    match raw {
        BatchResult::SingleSymbol { rows } => {
            // The answer belongs to the first requested ticker; anything else
            // in the request was not answered.
            if let Some((ticker, rest)) = requested.split_first() {
                classify(&mut out, ticker, rows, provider_tag);
                out.unresolved.extend(rest.iter().cloned());
            }
        }
        BatchResult::MultiSymbol { rows_by_ticker } => {
            for ticker in requested {
                match rows_by_ticker.get(ticker) {
                    Some(rows) => classify(&mut out, ticker, rows, provider_tag),
                    None => out.unresolved.push(ticker.clone()),
                }
            }
        }
    }

    out
}

fn classify(out: &mut Normalized, ticker: &str, bars: &[RawBar], provider_tag: &str) {
    let before = out.rows.len();
    out.rows.extend(
        bars.iter()
            .filter(|bar| !bar.is_all_null())
            .map(|bar| to_row(bar, ticker, provider_tag)),
    );
    if out.rows.len() > before {
        out.succeeded.push(ticker.to_string());
    } else {
        out.no_data.push(ticker.to_string());
    }
}

fn to_row(bar: &RawBar, ticker: &str, provider_tag: &str) -> PriceRow {
    PriceRow {
        date: bar.date,
        ticker: ticker.to_string(),
        open: coerce_f64(&bar.open),
        high: coerce_f64(&bar.high),
        low: coerce_f64(&bar.low),
        close: coerce_f64(&bar.close),
        volume: coerce_volume(&bar.volume),
        adjusted_close: coerce_f64(&bar.adj_close),
        provider_tag: provider_tag.to_string(),
    }
}
