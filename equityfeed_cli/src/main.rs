mod commands;
mod output;
mod progress;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "equityfeed")]
#[command(about = "Download NYSE equity prices from Yahoo Finance, Twelve Data and Alpha Vantage")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// TOML file with download settings (batch_size, max_retries_per_ticker, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily price history in retrying batches
    History(Box<commands::history::HistoryArgs>),
    /// List listed securities from the NASDAQ Trader symbol directory
    Tickers(commands::tickers::TickersArgs),
    /// Fetch intraday bars for one symbol from Twelve Data or Alpha Vantage
    Intraday(commands::intraday::IntradayArgs),
    /// Fetch the latest session open price for many tickers
    LatestOpen(commands::latest_open::LatestOpenArgs),
    /// Check connectivity to the keyed intraday providers
    SmokeTest(commands::smoke_test::SmokeTestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("equityfeed=info".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "table" => OutputFormat::Table,
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        other => bail!(
            "Unknown output format '{}'. Valid: table, json, csv, markdown",
            other
        ),
    };

    match &cli.command {
        Commands::History(args) => {
            commands::history::run(args.as_ref(), cli.config.as_deref(), cli.quiet, &format)
                .await?
        }
        Commands::Tickers(args) => commands::tickers::run(args, &format).await?,
        Commands::Intraday(args) => commands::intraday::run(args, &format).await?,
        Commands::LatestOpen(args) => {
            commands::latest_open::run(args, cli.quiet, &format).await?
        }
        Commands::SmokeTest(args) => {
            if !commands::smoke_test::run(args).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
