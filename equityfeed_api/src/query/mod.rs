mod alpha_vantage;
mod chart;
mod common;
mod twelve_data;

pub use self::alpha_vantage::{AlphaVantageFunction, AlphaVantageQuery, OutputSize};
pub use self::chart::ChartQuery;
pub use self::common::Query;
pub use self::twelve_data::TimeSeriesQuery;
