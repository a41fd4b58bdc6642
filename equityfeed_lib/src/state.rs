//! Per-ticker bookkeeping for one download run.

use std::collections::{HashMap, VecDeque};

/// Terminal outcome of a ticker. Once set it never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Succeeded,
    ConfirmedNoData,
    PermanentlyFailed,
}

/// Counters and outcome for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerState {
    /// Batch transport failures plus unresolved-in-response occurrences.
    pub attempt_count: u32,
    /// Consecutive empty responses; reset by any other outcome.
    pub no_data_count: u32,
    pub disposition: Option<Disposition>,
}

/// What happened to a ticker after it was accounted for in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Back in the queue. Carries the attempt number used for backoff.
    Requeued(u32),
    Finalized(Disposition),
}

/// Queue plus per-ticker state, owned by a single orchestrator invocation.
#[derive(Debug)]
pub struct WorkState {
    queue: VecDeque<String>,
    tickers: HashMap<String, TickerState>,
    order: Vec<String>,
    max_retries: u32,
    no_data_confirmations: u32,
    finalized: usize,
}

impl WorkState {
    /// Seeds the queue with `tickers`, dropping later duplicates.
    pub fn new<S: AsRef<str>>(tickers: &[S], max_retries: u32, no_data_confirmations: u32) -> Self {
        let mut state = Self {
            queue: VecDeque::new(),
            tickers: HashMap::new(),
            order: Vec::new(),
            max_retries,
            no_data_confirmations,
            finalized: 0,
        };
        for ticker in tickers {
            let ticker = ticker.as_ref();
            if state.tickers.contains_key(ticker) {
                continue;
            }
            state.tickers.insert(ticker.to_string(), TickerState::default());
            state.order.push(ticker.to_string());
            state.queue.push_back(ticker.to_string());
        }
        state
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn finalized(&self) -> usize {
        self.finalized
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes up to `size` tickers from the front of the queue.
    pub fn next_batch(&mut self, size: usize) -> Vec<String> {
        let n = size.min(self.queue.len());
        self.queue.drain(..n).collect()
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerState> {
        self.tickers.get(ticker)
    }

    /// The whole batch call failed before any data came back.
    pub fn record_transport_failure(&mut self, ticker: &str) -> Outcome {
        let max_retries = self.max_retries;
        let state = self.state_mut(ticker);
        state.no_data_count = 0;
        state.attempt_count += 1;
        let attempt = state.attempt_count;
        if attempt <= max_retries {
            self.requeue(ticker, attempt)
        } else {
            self.finalize(ticker, Disposition::PermanentlyFailed)
        }
    }

    /// The provider answered but did not mention this ticker.
    pub fn record_unresolved(&mut self, ticker: &str) -> Outcome {
        // Counted against the same budget as a transport failure.
        self.record_transport_failure(ticker)
    }

    pub fn record_success(&mut self, ticker: &str) -> Outcome {
        self.state_mut(ticker).no_data_count = 0;
        self.finalize(ticker, Disposition::Succeeded)
    }

    /// The provider knows the ticker but sent no rows for the range.
    pub fn record_no_data(&mut self, ticker: &str) -> Outcome {
        let confirmations = self.no_data_confirmations;
        let state = self.state_mut(ticker);
        state.no_data_count += 1;
        let count = state.no_data_count;
        if count >= confirmations {
            self.finalize(ticker, Disposition::ConfirmedNoData)
        } else {
            self.requeue(ticker, count)
        }
    }

    /// Tickers with `disposition`, in first-seen input order.
    pub fn with_disposition(&self, disposition: Disposition) -> Vec<String> {
        self.order
            .iter()
            .filter(|t| {
                self.tickers
                    .get(t.as_str())
                    .and_then(|s| s.disposition)
                    == Some(disposition)
            })
            .cloned()
            .collect()
    }

    pub fn failed(&self) -> Vec<String> {
        self.with_disposition(Disposition::PermanentlyFailed)
    }

    fn state_mut(&mut self, ticker: &str) -> &mut TickerState {
        self.tickers.entry(ticker.to_string()).or_default()
    }

    fn requeue(&mut self, ticker: &str, attempt: u32) -> Outcome {
        self.queue.push_back(ticker.to_string());
        Outcome::Requeued(attempt)
    }

    fn finalize(&mut self, ticker: &str, disposition: Disposition) -> Outcome {
        let state = self.state_mut(ticker);
        if state.disposition.is_none() {
            state.disposition = Some(disposition);
            self.finalized += 1;
        }
        Outcome::Finalized(disposition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_dedupes_in_order() {
        let mut state = WorkState::new(&["AAPL", "IBM", "AAPL", "MSFT", "IBM"], 4, 2);
        assert_eq!(state.total(), 3);
        assert_eq!(state.next_batch(10), vec!["AAPL", "IBM", "MSFT"]);
        assert!(state.is_done());
    }

    #[test]
    fn batches_are_taken_from_the_front() {
        let mut state = WorkState::new(&["A", "B", "C"], 4, 2);
        assert_eq!(state.next_batch(2), vec!["A", "B"]);
        assert_eq!(state.pending(), 1);
        assert_eq!(state.next_batch(2), vec!["C"]);
    }

    #[test]
    fn transport_failures_exhaust_budget() {
        let mut state = WorkState::new(&["IBM"], 2, 2);
        state.next_batch(1);
        assert_eq!(state.record_transport_failure("IBM"), Outcome::Requeued(1));
        state.next_batch(1);
        assert_eq!(state.record_transport_failure("IBM"), Outcome::Requeued(2));
        state.next_batch(1);
        assert_eq!(
            state.record_transport_failure("IBM"),
            Outcome::Finalized(Disposition::PermanentlyFailed)
        );
        assert!(state.is_done());
        assert_eq!(state.failed(), vec!["IBM"]);
        assert_eq!(state.finalized(), 1);
    }

    #[test]
    fn zero_retries_fails_on_first_miss() {
        let mut state = WorkState::new(&["ZZZZ"], 0, 2);
        state.next_batch(1);
        assert_eq!(
            state.record_unresolved("ZZZZ"),
            Outcome::Finalized(Disposition::PermanentlyFailed)
        );
    }

    #[test]
    fn no_data_confirms_after_threshold() {
        let mut state = WorkState::new(&["IBM"], 4, 2);
        state.next_batch(1);
        assert_eq!(state.record_no_data("IBM"), Outcome::Requeued(1));
        state.next_batch(1);
        assert_eq!(
            state.record_no_data("IBM"),
            Outcome::Finalized(Disposition::ConfirmedNoData)
        );
        assert_eq!(state.get("IBM").unwrap().attempt_count, 0);
    }

    #[test]
    fn other_outcomes_reset_no_data_count() {
        let mut state = WorkState::new(&["IBM"], 4, 3);
        state.next_batch(1);
        state.record_no_data("IBM");
        state.next_batch(1);
        state.record_no_data("IBM");
        assert_eq!(state.get("IBM").unwrap().no_data_count, 2);
        state.next_batch(1);
        state.record_unresolved("IBM");
        let s = state.get("IBM").unwrap();
        assert_eq!(s.no_data_count, 0);
        assert_eq!(s.attempt_count, 1);

        state.next_batch(1);
        state.record_no_data("IBM");
        state.next_batch(1);
        state.record_transport_failure("IBM");
        assert_eq!(state.get("IBM").unwrap().no_data_count, 0);
    }

    #[test]
    fn success_finalizes_once() {
        let mut state = WorkState::new(&["AAPL"], 4, 2);
        state.next_batch(1);
        assert_eq!(
            state.record_success("AAPL"),
            Outcome::Finalized(Disposition::Succeeded)
        );
        assert_eq!(state.finalized(), 1);
        assert_eq!(state.get("AAPL").unwrap().disposition, Some(Disposition::Succeeded));
        assert_eq!(state.with_disposition(Disposition::Succeeded), vec!["AAPL"]);
    }
}
