//! Retry delay and ETA arithmetic.

use std::time::Duration;

/// Upper bound on any single backoff sleep.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential backoff: `base × 2^(attempt − 1)`, capped at [`MAX_BACKOFF`].
///
/// Attempt 0 is treated as attempt 1. A zero or non-finite base yields no delay.
pub fn backoff_delay(base_seconds: f64, attempt: u32) -> Duration {
    if !base_seconds.is_finite() || base_seconds <= 0.0 {
        return Duration::ZERO;
    }
    let shift = attempt.saturating_sub(1).min(30);
    let secs = base_seconds * f64::from(1u32 << shift);
    Duration::from_secs_f64(secs.min(MAX_BACKOFF.as_secs_f64()))
}

/// Linear ETA extrapolated from the average time per finalized ticker.
///
/// Zero while nothing is finalized yet.
pub fn estimate_eta(elapsed: Duration, finalized: usize, total: usize) -> Duration {
    if finalized == 0 {
        return Duration::ZERO;
    }
    let remaining = total.saturating_sub(finalized) as f64;
    Duration::from_secs_f64(elapsed.as_secs_f64() / finalized as f64 * remaining)
}

/// Formats seconds as `1h 02m 03s`, or `2m 03s` below an hour.
pub fn format_eta(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, secs)
    } else {
        format!("{}m {:02}s", minutes, secs)
    }
}

/// [`format_eta`] for a `Duration`.
pub fn format_duration(d: Duration) -> String {
    format_eta(d.as_secs_f64())
}
