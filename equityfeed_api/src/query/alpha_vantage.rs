use std::fmt;
use std::str::FromStr;

use url::Url;

use super::common::Query;

/// Alpha Vantage `function` parameter values we use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaVantageFunction {
    TimeSeriesIntraday,
    TimeSeriesDaily,
}

impl fmt::Display for AlphaVantageFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlphaVantageFunction::TimeSeriesIntraday => "TIME_SERIES_INTRADAY",
            AlphaVantageFunction::TimeSeriesDaily => "TIME_SERIES_DAILY",
        };
        write!(f, "{}", s)
    }
}

/// Alpha Vantage `outputsize`: the latest 100 points, or the full history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputSize {
    #[default]
    Compact,
    Full,
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSize::Compact => write!(f, "compact"),
            OutputSize::Full => write!(f, "full"),
        }
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(format!("unknown output size '{}'", other)),
        }
    }
}

/// Alpha Vantage `/query` request.
#[derive(Clone, Debug)]
pub struct AlphaVantageQuery {
    pub function: AlphaVantageFunction,
    pub symbol: String,
    pub interval: Option<String>,
    pub outputsize: OutputSize,
}

impl AlphaVantageQuery {
    pub fn intraday(symbol: &str, interval: &str, outputsize: OutputSize) -> Self {
        Self {
            function: AlphaVantageFunction::TimeSeriesIntraday,
            symbol: symbol.to_string(),
            interval: Some(interval.to_string()),
            outputsize,
        }
    }

    pub fn daily(symbol: &str) -> Self {
        Self {
            function: AlphaVantageFunction::TimeSeriesDaily,
            symbol: symbol.to_string(),
            interval: None,
            outputsize: OutputSize::Compact,
        }
    }

    /// The JSON key holding the time series in the response.
    pub fn series_key(&self) -> String {
        match (&self.function, &self.interval) {
            (AlphaVantageFunction::TimeSeriesIntraday, Some(interval)) => {
                format!("Time Series ({})", interval)
            }
            _ => "Time Series (Daily)".to_string(),
        }
    }
}

impl Query for AlphaVantageQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("function", &self.function.to_string())
            .append_pair("symbol", &self.symbol);
        if let Some(interval) = &self.interval {
            url.query_pairs_mut().append_pair("interval", interval);
        }
        url.query_pairs_mut()
            .append_pair("outputsize", &self.outputsize.to_string());
        url
    }
}
