//! Error types for the library layer.

use thiserror::Error;

/// Maximum number of failed tickers named in a [`DownloadError::DownloadFailure`].
pub const FAILURE_SAMPLE_LIMIT: usize = 20;

/// A batch call failed as a whole (network error, throttling, server error).
///
/// Raised by [`BatchQuoteProvider`](crate::batch::BatchQuoteProvider)
/// implementations and always absorbed by the orchestrator round that made
/// the call: it becomes per-ticker attempt accounting, never a returned error.
#[derive(Error, Debug)]
#[error("{provider} batch of {batch_len} ticker(s) failed: {message}")]
pub struct ProviderError {
    pub provider: String,
    pub batch_len: usize,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &str, batch_len: usize, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            batch_len,
            message: message.into(),
        }
    }
}

/// Errors produced by the library layer.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Invalid parameters, detected before any provider call.
    #[error("{0}")]
    Configuration(String),
    /// Some tickers exhausted their retry budget.
    #[error("Failed to download {failed_count} ticker(s) after retries: {}", .sample.join(", "))]
    DownloadFailure {
        failed_count: usize,
        /// Up to [`FAILURE_SAMPLE_LIMIT`] failed tickers, sorted.
        sample: Vec<String>,
    },
    /// Every ticker finalized but the provider returned no rows at all.
    #[error("No historical price data returned from {provider}")]
    NoData { provider: String },
    /// The latest-open pass found no usable open price for any ticker.
    #[error("No opening prices returned from {provider}")]
    NoOpenPrices { provider: String },
    /// A batch failed on a path that does not retry.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Writing the result table failed.
    #[error("Output error: {0}")]
    Output(String),
    /// An error from an API client outside the retry loop.
    #[error("API error: {0}")]
    Api(#[from] equityfeed_api::Error),
}

impl DownloadError {
    /// Builds a [`DownloadError::DownloadFailure`] from the full failure list.
    pub fn download_failure(failed: &[String]) -> Self {
        let mut sample: Vec<String> = failed.to_vec();
        sample.sort();
        sample.truncate(FAILURE_SAMPLE_LIMIT);
        Self::DownloadFailure {
            failed_count: failed.len(),
            sample,
        }
    }
}

impl From<csv::Error> for DownloadError {
    fn from(e: csv::Error) -> Self {
        Self::Output(e.to_string())
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        Self::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_sorts_and_caps_sample() {
        let failed: Vec<String> = (0..25).rev().map(|i| format!("T{:02}", i)).collect();
        let err = DownloadError::download_failure(&failed);
        match &err {
            DownloadError::DownloadFailure {
                failed_count,
                sample,
            } => {
                assert_eq!(*failed_count, 25);
                assert_eq!(sample.len(), 20);
                assert_eq!(sample[0], "T00");
                assert_eq!(sample[19], "T19");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err
            .to_string()
            .starts_with("Failed to download 25 ticker(s) after retries: T00, T01"));
    }

    #[test]
    fn no_data_names_provider() {
        let err = DownloadError::NoData {
            provider: "yahoo".into(),
        };
        assert_eq!(err.to_string(), "No historical price data returned from yahoo");
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::new("yahoo", 3, "Request failed");
        assert_eq!(err.to_string(), "yahoo batch of 3 ticker(s) failed: Request failed");
    }
}
