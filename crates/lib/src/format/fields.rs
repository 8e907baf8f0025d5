//! Field formatters. Each one is total: anything that cannot be coerced renders
//! as the `N/A` placeholder.

use crate::payload::PLACEHOLDER;
use chrono::DateTime;
use serde_json::Value;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Format a price-like value as `#,###.##`.
///
/// Accepts JSON numbers and numeric strings; rejects NaN and infinities.
pub fn fmt_price(value: Option<&Value>) -> String {
    match value.and_then(finite_f64) {
        Some(x) => group_thousands(x),
        None => PLACEHOLDER.to_string(),
    }
}

/// Format epoch milliseconds (integer or integer string) as `YYYY-MM-DD HH:MM UTC`.
pub fn fmt_time_ms(value: Option<&Value>) -> String {
    let ms = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    ms.and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Format a time value: a non-empty string is preformatted and used verbatim,
/// anything else goes through [`fmt_time_ms`].
pub fn fmt_time(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        other => fmt_time_ms(other),
    }
}

fn finite_f64(value: &Value) -> Option<f64> {
    let x = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    x.is_finite().then_some(x)
}

fn group_thousands(x: f64) -> String {
    let fixed = format!("{:.2}", x);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('.');
    out.push_str(frac_part);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn price(v: Value) -> String {
        fmt_price(Some(&v))
    }

    fn is_grouped_price(s: &str) -> bool {
        let s = s.strip_prefix('-').unwrap_or(s);
        let Some((int_part, frac)) = s.split_once('.') else {
            return false;
        };
        let groups: Vec<&str> = int_part.split(',').collect();
        frac.len() == 2
            && frac.chars().all(|c| c.is_ascii_digit())
            && (1..=3).contains(&groups[0].len())
            && groups[1..].iter().all(|g| g.len() == 3)
            && groups.iter().all(|g| g.chars().all(|c| c.is_ascii_digit()))
    }

    #[test]
    fn price_numbers() {
        assert_eq!(price(json!(1900.5)), "1,900.50");
        assert_eq!(price(json!(0)), "0.00");
        assert_eq!(price(json!(999.999)), "1,000.00");
        assert_eq!(price(json!(1234567.891)), "1,234,567.89");
        assert_eq!(price(json!(-1234.5)), "-1,234.50");
        assert_eq!(price(json!(12)), "12.00");
        assert_eq!(price(json!(123456)), "123,456.00");
    }

    #[test]
    fn price_numeric_strings() {
        assert_eq!(price(json!("2650.1")), "2,650.10");
        assert_eq!(price(json!(" 42 ")), "42.00");
        assert_eq!(price(json!("1e3")), "1,000.00");
    }

    #[test]
    fn price_non_numeric_is_placeholder() {
        for v in [
            json!("abc"),
            json!(""),
            json!("NaN"),
            json!("inf"),
            json!(null),
            json!(true),
            json!({"a": 1}),
            json!([1]),
        ] {
            assert_eq!(price(v.clone()), PLACEHOLDER, "input {v}");
        }
        assert_eq!(fmt_price(None), PLACEHOLDER);
    }

    #[test]
    fn price_output_shape_holds_across_magnitudes() {
        let mut x = 0.004_f64;
        while x < 1e15 {
            for v in [x, -x, x * 7.3] {
                let s = price(json!(v));
                assert!(is_grouped_price(&s), "{v} -> {s}");
            }
            x *= 3.1;
        }
    }

    #[test]
    fn time_from_epoch_ms() {
        assert_eq!(fmt_time_ms(Some(&json!(0))), "1970-01-01 00:00 UTC");
        assert_eq!(fmt_time_ms(Some(&json!(1768928880000_i64))), "2026-01-20 17:08 UTC");
        assert_eq!(fmt_time_ms(Some(&json!("1768928880000"))), "2026-01-20 17:08 UTC");
        assert_eq!(fmt_time_ms(Some(&json!(-60_000))), "1969-12-31 23:59 UTC");
    }

    #[test]
    fn time_round_trips_through_chrono() {
        for ms in [0_i64, 86_399_999, 951_782_400_000, 1_700_000_000_123, 4_102_444_800_000] {
            let expected = DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string());
            assert_eq!(Some(fmt_time_ms(Some(&json!(ms)))), expected);
        }
    }

    #[test]
    fn time_non_integer_is_placeholder() {
        for v in [json!(1.5), json!("soon"), json!(null), json!({}), json!(u64::MAX), json!(true)] {
            assert_eq!(fmt_time_ms(Some(&v)), PLACEHOLDER, "input {v}");
        }
        assert_eq!(fmt_time_ms(None), PLACEHOLDER);
    }

    #[test]
    fn preformatted_time_is_verbatim() {
        assert_eq!(fmt_time(Some(&json!("2026-01-20 17:08 UTC"))), "2026-01-20 17:08 UTC");
        assert_eq!(fmt_time(Some(&json!(0))), "1970-01-01 00:00 UTC");
        assert_eq!(fmt_time(Some(&json!(""))), PLACEHOLDER);
    }
}
