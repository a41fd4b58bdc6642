mod client;
mod errors;
mod query;
mod user_agent;

pub mod alpha_vantage;
pub mod coerce;
pub mod symbol_directory;
pub mod twelve_data;
pub mod types;
pub mod yahoo;

pub use self::alpha_vantage::AlphaVantageClient;
pub use self::client::{require_api_key, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::query::{
    AlphaVantageFunction, AlphaVantageQuery, ChartQuery, OutputSize, Query, TimeSeriesQuery,
};
pub use self::symbol_directory::SymbolDirectoryClient;
pub use self::twelve_data::TwelveDataClient;
pub use self::yahoo::YahooClient;
