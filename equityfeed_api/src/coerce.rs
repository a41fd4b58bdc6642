//! Lenient numeric coercion for provider payloads.
//!
//! Providers disagree on how they encode numbers: Yahoo sends JSON numbers or
//! `null`, Twelve Data and Alpha Vantage send strings. Anything that does not
//! parse into a finite number becomes `None`; these helpers never fail.

use serde_json::Value;

/// Coerces a JSON value into a finite `f64`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Coerces a JSON value into a share volume. Negative values are rejected.
pub fn coerce_volume(value: &Value) -> Option<u64> {
    if let Value::Number(n) = value {
        if let Some(v) = n.as_u64() {
            return Some(v);
        }
    }
    coerce_f64(value)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_pass_through() {
        assert_eq!(coerce_f64(&json!(190.5)), Some(190.5));
        assert_eq!(coerce_f64(&json!(12)), Some(12.0));
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert_eq!(coerce_f64(&json!("249.8")), Some(249.8));
        assert_eq!(coerce_f64(&json!(" 1e2 ")), Some(100.0));
    }

    #[test]
    fn garbage_becomes_none() {
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!("n/a")), None);
        assert_eq!(coerce_f64(&json!("NaN")), None);
        assert_eq!(coerce_f64(&json!(true)), None);
        assert_eq!(coerce_f64(&json!({"v": 1})), None);
    }

    #[test]
    fn volume_coercion() {
        assert_eq!(coerce_volume(&json!(54321)), Some(54321));
        assert_eq!(coerce_volume(&json!("12345")), Some(12345));
        assert_eq!(coerce_volume(&json!(1900.0)), Some(1900));
        assert_eq!(coerce_volume(&json!(-5)), None);
        assert_eq!(coerce_volume(&json!(null)), None);
    }
}
