//! Cell coercion: raw text to typed [`Value`]s.
//!
//! Coercion never fails. Missing markers and unparseable numbers degrade to the declared type's
//! zero value; this is a data-quality policy, not an error.

use crate::types::{DataType, Value};

/// Cell contents treated as "no value" (compared case-insensitively after trimming).
const MISSING_MARKERS: [&str; 3] = ["na", "n/a", "null"];

/// Whether a cell is absent, blank, or one of the missing markers.
pub fn is_missing(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") => true,
        Some(s) => MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)),
    }
}

/// Parse a float cell. Thousands separators (`,`) are stripped first.
///
/// Returns `None` for missing cells, parse failures and non-finite results (`nan`, `inf`).
/// `-0` and `-0.0` come back as `0.0`.
pub fn parse_float(raw: Option<&str>) -> Option<f64> {
    if is_missing(raw) {
        return None;
    }
    let cleaned: String = raw?.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v + 0.0)
}

/// Parse an integer cell, accepting float spellings such as `"2020.0"` (truncated).
pub fn parse_int(raw: Option<&str>) -> Option<i64> {
    if is_missing(raw) {
        return None;
    }
    let trimmed = raw?.trim();
    match trimmed.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => parse_float(Some(trimmed)).map(|v| v.trunc() as i64),
    }
}

/// Trim and collapse internal whitespace runs to single spaces.
///
/// Missing markers become the empty string.
pub fn clean_text(raw: Option<&str>) -> String {
    if is_missing(raw) {
        return String::new();
    }
    raw.unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn coerce_float(raw: Option<&str>) -> f64 {
    parse_float(raw).unwrap_or(0.0)
}

pub fn coerce_int(raw: Option<&str>) -> i64 {
    parse_int(raw).unwrap_or(0)
}

/// Coerce a raw cell according to the declared type of `data_type`.
pub fn coerce_typed(data_type: DataType, raw: Option<&str>) -> Value {
    match data_type {
        DataType::Int64 => Value::Int64(coerce_int(raw)),
        DataType::Float64 => Value::Float64(coerce_float(raw)),
        DataType::Utf8 => Value::Utf8(clean_text(raw)),
    }
}

/// Coerce a raw cell for a canonical field identifier.
///
/// Core numeric fields parse as numbers; every other identifier is treated as text.
pub fn coerce_value(canonical: &str, raw: Option<&str>) -> Value {
    coerce_typed(DataType::for_canonical(canonical), raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_default_for_every_type() {
        for raw in [None, Some(""), Some("  "), Some("NA"), Some("na"), Some("N/A"), Some("null"), Some("NULL")] {
            assert_eq!(coerce_value("year", raw), Value::Int64(0), "raw {raw:?}");
            assert_eq!(coerce_value("gdp", raw), Value::Float64(0.0), "raw {raw:?}");
            assert_eq!(coerce_value("country", raw), Value::Utf8(String::new()), "raw {raw:?}");
        }
    }

    #[test]
    fn integers_tolerate_float_spellings() {
        assert_eq!(coerce_int(Some("2020")), 2020);
        assert_eq!(coerce_int(Some(" 2020.0 ")), 2020);
        assert_eq!(coerce_int(Some("1999.9")), 1999);
        assert_eq!(coerce_int(Some("-3.7")), -3);
        assert_eq!(parse_int(Some("twenty")), None);
        assert_eq!(coerce_int(Some("twenty")), 0);
    }

    #[test]
    fn floats_strip_thousands_separators() {
        assert_eq!(coerce_float(Some("1,234.5")), 1234.5);
        assert_eq!(coerce_float(Some(" -0.25 ")), -0.25);
        assert_eq!(coerce_float(Some("1e3")), 1000.0);
        assert_eq!(coerce_float(Some("abc")), 0.0);
    }

    #[test]
    fn negative_zero_folds_to_zero() {
        for raw in ["-0", "-0.0", " -0.000 "] {
            let v = coerce_float(Some(raw));
            assert_eq!(v, 0.0);
            assert!(v.is_sign_positive(), "raw {raw:?}");
        }
    }

    #[test]
    fn non_finite_parses_default() {
        assert_eq!(parse_float(Some("NaN")), None);
        assert_eq!(parse_float(Some("inf")), None);
        assert_eq!(coerce_float(Some("-infinity")), 0.0);
    }

    #[test]
    fn text_is_trimmed_and_collapsed() {
        assert_eq!(clean_text(Some("  United   States \t of America ")), "United States of America");
        assert_eq!(coerce_value("notes", Some(" a  b ")), Value::Utf8("a b".into()));
        assert_eq!(coerce_value("notes", Some("42")), Value::Utf8("42".into()));
    }
}
