//! Library layer for equityfeed: batched, retrying price downloads.
//!
//! Builds on the raw clients in `equityfeed_api` with a batch provider
//! abstraction, a result normalizer, the retry/backoff orchestrator, the
//! ticker universe, a CSV sink and a few one-shot helpers.

pub mod backoff;
pub mod batch;
pub mod config;
pub mod error;
pub mod history;
pub mod latest_open;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod smoke;
pub mod state;
pub mod table;
pub mod universe;
pub mod yahoo;

pub use equityfeed_api;
pub use equityfeed_api::types;

pub use batch::{BatchQuoteProvider, BatchResult, DateRange};
pub use config::{ConfigOverrides, DownloadConfig};
pub use error::{DownloadError, ProviderError};
pub use history::download_history;
pub use latest_open::{latest_open_prices, OpenPrice};
pub use normalize::{normalize, Normalized};
pub use progress::{BatchStart, DownloadObserver, LogObserver, NoopObserver, RoundReport};
pub use smoke::{smoke_test_connections, ConnectionCheck};
pub use table::{PriceRow, PriceTable};
pub use universe::{fetch_nyse_tickers, fetch_nyse_tickers_with_names, list_tickers, ListedSecurity};
pub use yahoo::YahooBatchProvider;
