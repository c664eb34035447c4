//! Date normalization for `datestartswith`.
//!
//! Both sides of a `datestartswith` comparison are rewritten to a canonical
//! `YYYY-MM-DD HH:MM:SS` prefix holding exactly the precision that was
//! written, so the comparison becomes a plain prefix test.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde_json::Value;

/// `YYYY[-MM[-DD[( |T)HH[:MM[:SS[.fff]]]]]]` with an optional `Z` or
/// `±HH[:]MM` suffix. Two-digit years are accepted.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}|\d{2})(?:-(\d{1,2})(?:-(\d{1,2})(?:[ T](\d{1,2})(?::(\d{2})(?::(\d{2})(?:\.\d+)?)?)?)?)?)?(?:Z|[+-]\d{2}:?\d{2})?$",
    )
    .unwrap_or_else(|e| panic!("invalid date pattern: {e}"))
});

/// Normalizes a JSON value holding a date.
///
/// Strings are parsed as dates; integral numbers are read as their decimal
/// text (so `2020` is a year). Anything else is not a date.
pub fn normalize_date(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_date_str(s),
        Value::Number(n) if n.is_i64() || n.is_u64() => normalize_date_str(&n.to_string()),
        _ => None,
    }
}

/// Normalizes a date string, using the current year to expand two-digit
/// years.
///
/// ```
/// use tabfilter_rs::filter::normalize_date_str;
///
/// assert_eq!(normalize_date_str("2020-1-5T10:30Z").as_deref(), Some("2020-01-05 10:30"));
/// assert_eq!(normalize_date_str("2020-02-30"), None);
/// ```
pub fn normalize_date_str(input: &str) -> Option<String> {
    normalize_with_year(input, Local::now().year())
}

fn normalize_with_year(input: &str, current_year: i32) -> Option<String> {
    let caps = DATE_PATTERN.captures(input.trim())?;
    let digits = |i: usize| caps.get(i).map(|m| m.as_str().parse::<u32>());

    let year_text = caps.get(1)?.as_str();
    let year: i32 = year_text.parse().ok()?;
    let year = if year_text.len() == 2 {
        expand_year(year, current_year)
    } else {
        year
    };
    let mut out = format!("{year:04}");

    let Some(month) = digits(2) else {
        return Some(out);
    };
    let month = month.ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    out.push_str(&format!("-{month:02}"));

    let Some(day) = digits(3) else {
        return Some(out);
    };
    let day = day.ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?;
    out.push_str(&format!("-{day:02}"));

    let time = [(4, ' ', 23), (5, ':', 59), (6, ':', 59)];
    for (group, separator, max) in time {
        let Some(part) = digits(group) else {
            break;
        };
        let part = part.ok()?;
        if part > max {
            return None;
        }
        out.push_str(&format!("{separator}{part:02}"));
    }

    Some(out)
}

/// Expands a two-digit year into the window
/// `[current_year - 70, current_year + 29]`.
fn expand_year(two_digit: i32, current_year: i32) -> i32 {
    let base = current_year - 70;
    base + (two_digit - base.rem_euclid(100)).rem_euclid(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keeps_given_precision() {
        let cases = [
            ("2020", "2020"),
            ("2020-01", "2020-01"),
            ("2020-1-5", "2020-01-05"),
            ("2020-01-05T10", "2020-01-05 10"),
            ("2020-01-05 10:30", "2020-01-05 10:30"),
            ("2020-01-05 10:30:15.250", "2020-01-05 10:30:15"),
            ("2020-01-05T10:30:15+02:00", "2020-01-05 10:30:15"),
            ("2020-01-05T10:30:15Z", "2020-01-05 10:30:15"),
        ];
        for (input, expected) in cases {
            assert_eq!(
                normalize_with_year(input, 2024).as_deref(),
                Some(expected),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_rejects_invalid_dates() {
        for input in ["2020-13", "2021-02-29", "2020-01-05 24", "hello", "202", ""] {
            assert_eq!(normalize_with_year(input, 2024), None, "input: {input}");
        }
        assert!(normalize_with_year("2020-02-29", 2024).is_some());
    }

    #[test]
    fn test_two_digit_year_window() {
        assert_eq!(expand_year(24, 2024), 2024);
        assert_eq!(expand_year(53, 2024), 2053);
        assert_eq!(expand_year(54, 2024), 1954);
        assert_eq!(expand_year(0, 2024), 2000);
        assert_eq!(
            normalize_with_year("99-12-31", 2024).as_deref(),
            Some("1999-12-31")
        );
    }

    #[test]
    fn test_normalize_json_values() {
        assert_eq!(normalize_date(&json!(2020)).as_deref(), Some("2020"));
        assert_eq!(normalize_date(&json!(2020.5)), None);
        assert_eq!(normalize_date(&json!(true)), None);
        assert_eq!(normalize_date(&Value::Null), None);
        assert_eq!(
            normalize_date(&json!(" 2020-06-01 ")).as_deref(),
            Some("2020-06-01")
        );
    }
}
