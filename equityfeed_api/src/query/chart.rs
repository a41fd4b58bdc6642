use chrono::{Days, NaiveDate};
use url::Url;

use super::common::Query;

/// Daily chart query for one symbol over an inclusive date range.
///
/// Yahoo treats `period2` as exclusive, so the end date is pushed one day out.
#[derive(Clone, Copy, Debug)]
pub struct ChartQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ChartQuery {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn period1(&self) -> i64 {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
    }

    fn period2(&self) -> i64 {
        let end_exclusive = self.end.checked_add_days(Days::new(1)).unwrap_or(self.end);
        end_exclusive
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp()
    }
}

impl Query for ChartQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        url.query_pairs_mut()
            .append_pair("period1", &self.period1().to_string())
            .append_pair("period2", &self.period2().to_string())
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true")
            .append_pair("events", "div,splits");
        url
    }
}
