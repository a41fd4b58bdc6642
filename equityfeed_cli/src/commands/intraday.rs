use anyhow::{anyhow, bail, Result};
use clap::Args;
use equityfeed_lib::equityfeed_api::{AlphaVantageClient, OutputSize, TwelveDataClient};

use crate::output::{print_intraday, OutputFormat};

#[derive(Args)]
pub struct IntradayArgs {
    /// Data source: twelve-data or alpha-vantage
    #[arg(long, default_value = "twelve-data")]
    pub provider: String,

    /// Symbol to fetch
    #[arg(long)]
    pub symbol: String,

    /// Bar interval (1min, 5min, 15min, 30min, 60min)
    #[arg(long, default_value = "5min")]
    pub interval: String,

    /// Twelve Data: number of bars. Alpha Vantage: any value above 100 requests the full series
    #[arg(long, default_value = "100")]
    pub outputsize: u32,

    /// API key (default: TWELVE_DATA_API_KEY / ALPHA_VANTAGE_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,
}

pub async fn run(args: &IntradayArgs, format: &OutputFormat) -> Result<()> {
    let symbol = args.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        bail!("--symbol must not be empty");
    }

    let bars = match args.provider.as_str() {
        "twelve-data" | "twelvedata" => {
            let client = TwelveDataClient::new(args.api_key.as_deref())
                .map_err(|e| anyhow!("Failed to create Twelve Data client: {}", e))?;
            client
                .time_series(&symbol, &args.interval, args.outputsize)
                .await?
        }
        "alpha-vantage" | "alphavantage" => {
            let client = AlphaVantageClient::new(args.api_key.as_deref())
                .map_err(|e| anyhow!("Failed to create Alpha Vantage client: {}", e))?;
            let size = if args.outputsize > 100 {
                OutputSize::Full
            } else {
                OutputSize::Compact
            };
            client.intraday(&symbol, &args.interval, size).await?
        }
        other => bail!(
            "Unknown provider '{}'. Use: twelve-data, alpha-vantage",
            other
        ),
    };

    eprintln!("{} bars for {}", bars.len(), symbol);
    print_intraday(&bars, format)
}
