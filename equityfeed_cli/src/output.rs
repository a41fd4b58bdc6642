use anyhow::Result;
use equityfeed_lib::types::IntradayBar;
use equityfeed_lib::{ListedSecurity, OpenPrice, PriceTable};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled)]
struct PriceDisplayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    low: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Adj Close")]
    adjusted_close: String,
    #[tabled(rename = "Provider")]
    provider: String,
}

#[derive(Tabled, Serialize)]
struct SecurityRow {
    #[tabled(rename = "Ticker")]
    #[serde(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Company")]
    #[serde(rename = "CompanyName")]
    company_name: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    security_type: String,
}

#[derive(Tabled)]
struct IntradayDisplayRow {
    #[tabled(rename = "Datetime")]
    datetime: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    low: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Provider")]
    provider: String,
}

#[derive(Tabled)]
struct OpenPriceDisplayRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Ticker")]
    ticker: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "Provider")]
    provider: String,
}

// -- Row builders --

fn build_price_rows(table: &PriceTable) -> Vec<PriceDisplayRow> {
    table
        .rows()
        .iter()
        .map(|r| PriceDisplayRow {
            date: r.date.to_string(),
            ticker: r.ticker.clone(),
            open: format_price(r.open),
            high: format_price(r.high),
            low: format_price(r.low),
            close: format_price(r.close),
            volume: format_volume(r.volume),
            adjusted_close: format_price(r.adjusted_close),
            provider: r.provider_tag.clone(),
        })
        .collect()
}

fn build_security_rows(securities: &[ListedSecurity]) -> Vec<SecurityRow> {
    securities
        .iter()
        .map(|s| SecurityRow {
            ticker: s.ticker.clone(),
            company_name: s.company_name.clone(),
            security_type: s.security_type.to_string(),
        })
        .collect()
}

fn build_intraday_rows(bars: &[IntradayBar]) -> Vec<IntradayDisplayRow> {
    bars.iter()
        .map(|b| IntradayDisplayRow {
            datetime: b.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            open: format_price(b.open),
            high: format_price(b.high),
            low: format_price(b.low),
            close: format_price(b.close),
            volume: format_volume(b.volume),
            symbol: b.symbol.clone(),
            provider: b.provider.clone(),
        })
        .collect()
}

fn build_open_price_rows(prices: &[OpenPrice]) -> Vec<OpenPriceDisplayRow> {
    prices
        .iter()
        .map(|p| OpenPriceDisplayRow {
            date: p.date.to_string(),
            ticker: p.ticker.clone(),
            open: format!("{:.2}", p.open),
            provider: p.provider.clone(),
        })
        .collect()
}

fn render<T: Tabled>(rows: Vec<T>, markdown: bool) -> String {
    let mut table = Table::new(rows);
    if markdown {
        table.with(Style::markdown());
    }
    table.to_string()
}

fn write_csv_records<T: Serialize>(records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- Printers --

pub fn print_prices(table: &PriceTable, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render(build_price_rows(table), false)),
        OutputFormat::Markdown => println!("{}", render(build_price_rows(table), true)),
        OutputFormat::Json => print_json(&table.rows()),
        OutputFormat::Csv => equityfeed_lib::output::write_csv(table, std::io::stdout())?,
    }
    Ok(())
}

pub fn print_securities(securities: &[ListedSecurity], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render(build_security_rows(securities), false)),
        OutputFormat::Markdown => println!("{}", render(build_security_rows(securities), true)),
        OutputFormat::Json => print_json(&securities),
        OutputFormat::Csv => write_csv_records(&build_security_rows(securities))?,
    }
    Ok(())
}

pub fn print_intraday(bars: &[IntradayBar], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render(build_intraday_rows(bars), false)),
        OutputFormat::Markdown => println!("{}", render(build_intraday_rows(bars), true)),
        OutputFormat::Json => print_json(&bars),
        OutputFormat::Csv => write_csv_records(bars)?,
    }
    Ok(())
}

pub fn print_open_prices(prices: &[OpenPrice], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render(build_open_price_rows(prices), false)),
        OutputFormat::Markdown => println!("{}", render(build_open_price_rows(prices), true)),
        OutputFormat::Json => print_json(&prices),
        OutputFormat::Csv => write_csv_records(prices)?,
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_price(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

fn format_volume(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
