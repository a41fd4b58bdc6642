use chrono::NaiveDate;
use equityfeed_api::coerce::{coerce_f64, coerce_volume};
use equityfeed_api::symbol_directory::parse_other_listed;
use equityfeed_api::types::ChartResponse;
use equityfeed_api::Error;

#[test]
fn chart_fixture_into_bars() {
    let json_str = include_str!("fixtures/chart_ibm.json");
    let chart: ChartResponse = serde_json::from_str(json_str).unwrap();
    let bars = chart.into_bars("IBM").unwrap();

    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
    assert_eq!(coerce_f64(&bars[0].open), Some(248.0));
    assert_eq!(coerce_f64(&bars[1].adj_close), Some(250.3));
    assert_eq!(coerce_volume(&bars[1].volume), Some(2000));
}

#[test]
fn chart_not_found_fixture() {
    let json_str = include_str!("fixtures/chart_not_found.json");
    let chart: ChartResponse = serde_json::from_str(json_str).unwrap();
    let err = chart.into_bars("ZZZZ").unwrap_err();
    assert!(matches!(err, Error::SymbolNotFound(s) if s == "ZZZZ"));
}

#[test]
fn chart_without_timestamps_has_no_bars() {
    let json_str = include_str!("fixtures/chart_empty_range.json");
    let chart: ChartResponse = serde_json::from_str(json_str).unwrap();
    assert!(chart.into_bars("IBM").unwrap().is_empty());
}

#[test]
fn otherlisted_fixture_parses_every_data_row() {
    let text = include_str!("fixtures/otherlisted.txt");
    let entries = parse_other_listed(text).unwrap();

    assert_eq!(entries.len(), 9);
    assert_eq!(entries[0].act_symbol, "IBM");
    assert_eq!(
        entries[0].security_name,
        "International Business Machines Corporation Common Stock"
    );
    assert!(entries.iter().all(|e| !e.test_issue));
    let nyse = entries.iter().filter(|e| e.exchange == "N").count();
    assert_eq!(nyse, 7);
}
