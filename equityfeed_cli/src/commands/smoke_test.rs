use anyhow::Result;
use clap::Args;
use equityfeed_lib::smoke::{DEFAULT_ALPHA_SYMBOL, DEFAULT_TWELVE_SYMBOL};
use equityfeed_lib::smoke_test_connections;

#[derive(Args)]
pub struct SmokeTestArgs {
    /// Symbol used for the Twelve Data check
    #[arg(long, default_value = DEFAULT_TWELVE_SYMBOL)]
    pub twelve_symbol: String,

    /// Symbol used for the Alpha Vantage check
    #[arg(long, default_value = DEFAULT_ALPHA_SYMBOL)]
    pub alpha_symbol: String,
}

/// Prints one PASS/FAIL line per provider. Returns whether every check passed.
pub async fn run(args: &SmokeTestArgs) -> Result<bool> {
    let checks = smoke_test_connections(&args.twelve_symbol, &args.alpha_symbol).await;
    let mut all_ok = true;
    for check in &checks {
        let label = if check.ok { "[PASS]" } else { "[FAIL]" };
        println!("{} {}", label, check.message);
        all_ok &= check.ok;
    }
    Ok(all_ok)
}
