//! Cell coercion into typed values.
//!
//! Source exports disagree on date and number formats. Coercion is lenient
//! where the input is ambiguous and returns `None` where it is unusable;
//! it never fails.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading `YYYY-MM-DD`, possibly followed by a time part.
static ISO_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("Invalid ISO date regex"));

/// `D.M.Y`, `D/M/Y` or `D-M-Y` with 1-2 digit day/month and 2-4 digit year.
static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,2})[./-]([0-9]{1,2})[./-]([0-9]{2,4})$")
        .expect("Invalid day-month-year regex")
});

/// Two-digit years at or above this value belong to the 1900s.
const CENTURY_PIVOT: u32 = 70;

/// Length of an ISO `YYYY-MM-DD` date.
const ISO_DATE_LEN: usize = 10;

/// How unrecognised date strings are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    /// Keep the first 10 characters of an unrecognised value unvalidated.
    #[default]
    Lenient,
    /// Only accept values that name a real calendar date.
    Strict,
}

/// Coerces a cell into an ISO `YYYY-MM-DD` date string.
///
/// - `2024-03-05T10:00` keeps its date part
/// - `5.3.2024`, `05/03/2024`, `05-03-24` are read day first; two-digit
///   years pivot at 70 (`69` is 2069, `70` is 1970)
/// - anything else keeps its first 10 characters in [`DateMode::Lenient`]
///   and is rejected in [`DateMode::Strict`]
///
/// Blank input yields `None`.
pub fn coerce_date(raw: &str, mode: DateMode) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let candidate = if ISO_DATE_PREFIX.is_match(value) {
        value[..ISO_DATE_LEN].to_string()
    } else if let Some(caps) = DAY_MONTH_YEAR.captures(value) {
        let year = expand_year(&caps[3]);
        format!("{year:0>4}-{:0>2}-{:0>2}", &caps[2], &caps[1])
    } else {
        match mode {
            DateMode::Lenient => return Some(value.chars().take(ISO_DATE_LEN).collect()),
            DateMode::Strict => return None,
        }
    };

    match mode {
        DateMode::Lenient => Some(candidate),
        DateMode::Strict => NaiveDate::parse_from_str(&candidate, "%Y-%m-%d")
            .ok()
            .map(|_| candidate),
    }
}

fn expand_year(year: &str) -> String {
    if year.len() != 2 {
        return year.to_string();
    }
    let century = match year.parse::<u32>() {
        Ok(value) if value >= CENTURY_PIVOT => "19",
        _ => "20",
    };
    format!("{century}{year}")
}

/// Coerces a cell into a finite number.
///
/// All embedded whitespace is removed first, so `"1 234.50"` is `1234.5`.
/// Thousands separators other than whitespace are not recognised.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Coerces a cell into single-line text.
///
/// Trims and replaces each embedded line break with a space so a later
/// re-export cannot split the row. Blank input yields `None`.
pub fn coerce_text(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.replace("\r\n", " ").replace(['\r', '\n'], " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(raw: &str) -> Option<String> {
        coerce_date(raw, DateMode::Lenient)
    }

    fn strict(raw: &str) -> Option<String> {
        coerce_date(raw, DateMode::Strict)
    }

    #[test]
    fn test_iso_prefix() {
        assert_eq!(lenient("2024-03-05"), Some("2024-03-05".into()));
        assert_eq!(lenient("2024-03-05T10:15:00Z"), Some("2024-03-05".into()));
        assert_eq!(lenient(" 2024-03-05 10:15 "), Some("2024-03-05".into()));
    }

    #[test]
    fn test_day_month_year() {
        assert_eq!(lenient("05.03.2024"), Some("2024-03-05".into()));
        assert_eq!(lenient("5/3/2024"), Some("2024-03-05".into()));
        assert_eq!(lenient("5-3-2024"), Some("2024-03-05".into()));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(lenient("31.12.69"), Some("2069-12-31".into()));
        assert_eq!(lenient("01.01.70"), Some("1970-01-01".into()));
        assert_eq!(lenient("1.1.00"), Some("2000-01-01".into()));
        assert_eq!(lenient("1.1.99"), Some("1999-01-01".into()));
    }

    #[test]
    fn test_three_digit_year_is_padded() {
        assert_eq!(lenient("01.02.123"), Some("0123-02-01".into()));
    }

    #[test]
    fn test_lenient_fallback_truncates() {
        assert_eq!(lenient("March 5th, 2024"), Some("March 5th,".into()));
        assert_eq!(lenient("45356"), Some("45356".into()));
        assert_eq!(lenient("Мart 2024 yil"), Some("Мart 2024 ".into()));
    }

    #[test]
    fn test_strict_rejects_unrecognised_and_impossible() {
        assert_eq!(strict("March 5th, 2024"), None);
        assert_eq!(strict("31.02.2024"), None);
        assert_eq!(strict("2024-13-01"), None);
        assert_eq!(strict("29.02.2024"), Some("2024-02-29".into()));
    }

    #[test]
    fn test_lenient_keeps_impossible_dates() {
        assert_eq!(lenient("31.02.2024"), Some("2024-02-31".into()));
    }

    #[test]
    fn test_blank_date() {
        assert_eq!(lenient(""), None);
        assert_eq!(lenient("   "), None);
        assert_eq!(strict(""), None);
    }

    #[test]
    fn test_number() {
        assert_eq!(coerce_number("1 234.50"), Some(1234.5));
        assert_eq!(coerce_number("\u{a0}-12\u{a0}000 "), Some(-12000.0));
        assert_eq!(coerce_number("1.5e3"), Some(1500.0));
        assert_eq!(coerce_number("42"), Some(42.0));
    }

    #[test]
    fn test_number_rejects() {
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("  "), None);
        assert_eq!(coerce_number("abc"), None);
        assert_eq!(coerce_number("1,5"), None);
        assert_eq!(coerce_number("inf"), None);
        assert_eq!(coerce_number("NaN"), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(coerce_text("  Aliyev Vali "), Some("Aliyev Vali".into()));
        assert_eq!(coerce_text("line one\r\nline two\nthree\rfour"), Some("line one line two three four".into()));
        assert_eq!(coerce_text(""), None);
        assert_eq!(coerce_text(" \n "), None);
    }
}
