use url::Url;

use super::common::Query;

/// Twelve Data `/time_series` query.
#[derive(Clone, Debug)]
pub struct TimeSeriesQuery {
    pub symbol: String,
    pub interval: String,
    pub outputsize: u32,
}

impl TimeSeriesQuery {
    pub fn new(symbol: &str, interval: &str, outputsize: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            outputsize,
        }
    }
}

impl Query for TimeSeriesQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("symbol", &self.symbol)
            .append_pair("interval", &self.interval)
            .append_pair("outputsize", &self.outputsize.to_string());
        url
    }
}
