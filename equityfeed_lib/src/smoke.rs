//! Connectivity checks for the keyed intraday providers.

use equityfeed_api::{AlphaVantageClient, Error as ApiError, TwelveDataClient};
use serde::Serialize;

pub const DEFAULT_TWELVE_SYMBOL: &str = "AAPL";
pub const DEFAULT_ALPHA_SYMBOL: &str = "IBM";

/// Outcome of one provider check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionCheck {
    pub ok: bool,
    pub message: String,
}

impl ConnectionCheck {
    fn pass(message: String) -> Self {
        Self { ok: true, message }
    }

    fn fail(message: String) -> Self {
        Self { ok: false, message }
    }
}

/// Checks Twelve Data and Alpha Vantage with clients built from the
/// environment. A missing key is reported as a failed check, not an error.
pub async fn smoke_test_connections(
    twelve_symbol: &str,
    alpha_symbol: &str,
) -> Vec<ConnectionCheck> {
    run_checks(
        TwelveDataClient::new(None),
        AlphaVantageClient::new(None),
        twelve_symbol,
        alpha_symbol,
    )
    .await
}

/// Runs both checks with already-constructed (or failed) clients.
pub async fn run_checks(
    twelve: Result<TwelveDataClient, ApiError>,
    alpha: Result<AlphaVantageClient, ApiError>,
    twelve_symbol: &str,
    alpha_symbol: &str,
) -> Vec<ConnectionCheck> {
    let twelve_check = match twelve {
        Ok(client) => check_twelve_data(&client, twelve_symbol).await,
        Err(e) => ConnectionCheck::fail(format!("Twelve Data failed: {}", e)),
    };
    let alpha_check = match alpha {
        Ok(client) => check_alpha_vantage(&client, alpha_symbol).await,
        Err(e) => ConnectionCheck::fail(format!("Alpha Vantage failed: {}", e)),
    };
    vec![twelve_check, alpha_check]
}

/// Pulls the last two daily bars and reports the newest date.
pub async fn check_twelve_data(client: &TwelveDataClient, symbol: &str) -> ConnectionCheck {
    match client.time_series(symbol, "1day", 2).await {
        Ok(bars) => match bars.iter().map(|b| b.datetime).max() {
            Some(latest) => ConnectionCheck::pass(format!(
                "Twelve Data OK. Latest date for {}: {}",
                symbol,
                latest.format("%Y-%m-%d")
            )),
            None => ConnectionCheck::fail(format!(
                "Twelve Data failed: no rows returned for {}",
                symbol
            )),
        },
        Err(e) => {
            tracing::warn!("Twelve Data check failed: {}", e);
            ConnectionCheck::fail(format!("Twelve Data failed: {}", e))
        }
    }
}

/// Reports the newest date of the daily series.
pub async fn check_alpha_vantage(client: &AlphaVantageClient, symbol: &str) -> ConnectionCheck {
    match client.latest_daily_date(symbol).await {
        Ok(latest) => ConnectionCheck::pass(format!(
            "Alpha Vantage OK. Latest date for {}: {}",
            symbol, latest
        )),
        Err(e) => {
            tracing::warn!("Alpha Vantage check failed: {}", e);
            ConnectionCheck::fail(format!("Alpha Vantage failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn both_checks_pass() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/time_series"))
            .and(query_param("interval", "1day"))
            .and(query_param("outputsize", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [
                    {"datetime": "2026-02-18", "open": "190", "high": "191", "low": "189", "close": "190.5", "volume": "100"},
                    {"datetime": "2026-02-17", "open": "189", "high": "190", "low": "188", "close": "189.5", "volume": "100"}
                ],
                "status": "ok"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", "TIME_SERIES_DAILY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Time Series (Daily)": {
                    "2026-02-17": {"1. open": "248.0"},
                    "2026-02-18": {"1. open": "250.0"}
                }
            })))
            .mount(&server)
            .await;

        let checks = run_checks(
            TwelveDataClient::with_base_url(&server.uri(), "k".into()),
            AlphaVantageClient::with_base_url(&server.uri(), "k".into()),
            "AAPL",
            "IBM",
        )
        .await;

        assert_eq!(
            checks,
            vec![
                ConnectionCheck {
                    ok: true,
                    message: "Twelve Data OK. Latest date for AAPL: 2026-02-18".into()
                },
                ConnectionCheck {
                    ok: true,
                    message: "Alpha Vantage OK. Latest date for IBM: 2026-02-18".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn failures_are_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Note": "Thank you for using Alpha Vantage!"
            })))
            .mount(&server)
            .await;

        let checks = run_checks(
            Err(ApiError::MissingApiKey("TWELVE_DATA_API_KEY".into())),
            AlphaVantageClient::with_base_url(&server.uri(), "k".into()),
            "AAPL",
            "IBM",
        )
        .await;

        assert!(!checks[0].ok);
        assert_eq!(
            checks[0].message,
            "Twelve Data failed: Missing API key: TWELVE_DATA_API_KEY"
        );
        assert!(!checks[1].ok);
        assert_eq!(
            checks[1].message,
            "Alpha Vantage failed: Alpha Vantage rate limit for IBM: Thank you for using Alpha Vantage!"
        );
    }
}
