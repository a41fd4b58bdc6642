use anyhow::{anyhow, Result};
use clap::Args;
use equityfeed_lib::equityfeed_api::SymbolDirectoryClient;
use equityfeed_lib::types::SecurityType;
use equityfeed_lib::universe::{list_tickers, NYSE};

use crate::output::{print_securities, OutputFormat};

#[derive(Args)]
pub struct TickersArgs {
    /// Exchange code from the symbol directory (N = NYSE, A = NYSE American, P = NYSE Arca)
    #[arg(long, default_value = NYSE)]
    pub exchange: String,

    /// Include every exchange in the directory
    #[arg(long, conflicts_with = "exchange")]
    pub all_exchanges: bool,

    /// Filter by security type: stock, etf, etn, etc
    #[arg(long = "type")]
    pub security_type: Option<String>,

    /// Return at most N tickers (applied after sorting)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub async fn run(args: &TickersArgs, format: &OutputFormat) -> Result<()> {
    let security_type = match &args.security_type {
        Some(value) => Some(value.parse::<SecurityType>().map_err(|e| anyhow!(e))?),
        None => None,
    };
    let exchange = if args.all_exchanges {
        None
    } else {
        Some(args.exchange.trim().to_uppercase())
    };

    let client = SymbolDirectoryClient::new()
        .map_err(|e| anyhow!("Failed to create symbol directory client: {}", e))?;
    let securities = list_tickers(&client, exchange.as_deref(), security_type, args.limit).await?;

    eprintln!("{} securities", securities.len());
    print_securities(&securities, format)
}
