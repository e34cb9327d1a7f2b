//! Field normalization for raw CSV values
//!
//! Every function here is total: malformed input maps to `None`, never to a
//! panic or an error, so one bad cell cannot abort a batch. Importers share
//! these helpers instead of stripping currency symbols inline.

use chrono::{DateTime, NaiveDate};

use crate::entities::ProjectPhase;

/// Date formats tried in order by [`parse_date`]
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    // two-digit years first: %Y would read "24" as year 0024
    "%m/%d/%y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

/// Trim a value; blank and absent both become `None`
pub fn safe_string(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an integer, ignoring `$` and thousands separators.
///
/// Decimal input is truncated toward zero (`"12.7"` → `12`).
pub fn safe_int(raw: Option<&str>) -> Option<i64> {
    let cleaned = strip_chars(raw?, &['$', ',']);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(v) = cleaned.parse::<i64>() {
        return Some(v);
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

/// Parse a float, ignoring `$`, `%` and thousands separators
pub fn safe_float(raw: Option<&str>) -> Option<f64> {
    let cleaned = strip_chars(raw?, &['$', ',', '%']);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a percentage string such as `"5.2%"` into `5.2`
pub fn parse_percent(raw: Option<&str>) -> Option<f64> {
    safe_float(raw)
}

/// Parse a number with optional `K`/`M`/`B` magnitude suffix, unrounded.
///
/// `"6.5"` → `6.5`, `"$2.35M"` → `2350000.0`. A trailing `%` is not a
/// magnitude and yields `None`.
pub fn parse_magnitude(raw: Option<&str>) -> Option<f64> {
    let cleaned = strip_chars(raw?, &['$', ',', ' ']);
    if cleaned.is_empty() {
        return None;
    }

    let (number, multiplier) = match cleaned.chars().last().map(|c| c.to_ascii_uppercase()) {
        Some('B') => (&cleaned[..cleaned.len() - 1], 1e9),
        Some('M') => (&cleaned[..cleaned.len() - 1], 1e6),
        Some('K') => (&cleaned[..cleaned.len() - 1], 1e3),
        _ => (cleaned.as_str(), 1.0),
    };

    number
        .parse::<f64>()
        .ok()
        .map(|v| v * multiplier)
        .filter(|v| v.is_finite())
}

/// Parse a money amount with optional magnitude suffix.
///
/// `"$1,234,567"` → `1234567`, `"$1.5B"` → `1500000000`, `"43.8M"` →
/// `43800000`, `"750K"` → `750000`. The result is rounded to whole units.
pub fn parse_currency(raw: Option<&str>) -> Option<i64> {
    let scaled = parse_magnitude(raw)?.round();
    if scaled.abs() > i64::MAX as f64 {
        return None;
    }
    Some(scaled as i64)
}

/// Money amount as a float, for columns stored as REAL
pub fn parse_money(raw: Option<&str>) -> Option<f64> {
    parse_currency(raw).map(|v| v as f64)
}

/// Parse a calendar date from any of the formats exports commonly use
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw?.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Year-month only ("2024-03")
    if let Some((year, month)) = s.split_once('-') {
        if let (Ok(y), Ok(m)) = (year.parse::<i32>(), month.parse::<u32>()) {
            return NaiveDate::from_ymd_opt(y, m, 1);
        }
    }

    None
}

/// Lowercase a categorical value
pub fn lowercase_enum(raw: Option<&str>) -> Option<String> {
    safe_string(raw).map(|s| s.to_lowercase())
}

/// Split a comma-separated cell into trimmed, non-empty items
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Map a free-text project status onto a lifecycle phase
pub fn map_status_to_phase(raw: Option<&str>) -> ProjectPhase {
    let status = raw.unwrap_or_default().to_lowercase();
    if status.contains("planning") || status.contains("proposed") {
        ProjectPhase::Planning
    } else if status.contains("under construction") || status.contains("under-construction") {
        ProjectPhase::UnderConstruction
    } else if status.contains("completed") || status.contains("complete") {
        ProjectPhase::Completed
    } else if status.contains("approved") {
        ProjectPhase::Approved
    } else {
        ProjectPhase::Planning
    }
}

fn strip_chars(s: &str, chars: &[char]) -> String {
    s.trim().chars().filter(|c| !chars.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_string_trims_and_nulls_blanks() {
        assert_eq!(safe_string(Some("  Hines ")), Some("Hines".to_string()));
        assert_eq!(safe_string(Some("   ")), None);
        assert_eq!(safe_string(Some("")), None);
        assert_eq!(safe_string(None), None);
    }

    #[test]
    fn test_safe_int_non_numeric_is_none_not_zero() {
        assert_eq!(safe_int(Some("42")), Some(42));
        assert_eq!(safe_int(Some("1,250")), Some(1250));
        assert_eq!(safe_int(Some("12.7")), Some(12));
        assert_eq!(safe_int(Some("n/a")), None);
        assert_eq!(safe_int(Some("")), None);
        assert_eq!(safe_int(None), None);
    }

    #[test]
    fn test_safe_float_strips_symbols() {
        assert_eq!(safe_float(Some("$350,000.50")), Some(350000.5));
        assert_eq!(safe_float(Some("96.5%")), Some(96.5));
        assert_eq!(safe_float(Some("-3.2")), Some(-3.2));
        assert_eq!(safe_float(Some("unknown")), None);
        assert_eq!(safe_float(Some("NaN")), None);
    }

    #[test]
    fn test_currency_examples() {
        assert_eq!(parse_currency(Some("$1,234,567")), Some(1_234_567));
        assert_eq!(parse_currency(Some("$1.5B")), Some(1_500_000_000));
        assert_eq!(parse_currency(Some("$43.8M")), Some(43_800_000));
    }

    #[test]
    fn test_currency_suffix_variants() {
        assert_eq!(parse_currency(Some("750K")), Some(750_000));
        assert_eq!(parse_currency(Some("2.1b")), Some(2_100_000_000));
        assert_eq!(parse_currency(Some("$ 12 M")), Some(12_000_000));
        assert_eq!(parse_currency(Some("TBD")), None);
        assert_eq!(parse_currency(Some("$")), None);
        assert_eq!(parse_currency(None), None);
    }

    #[test]
    fn test_magnitude_keeps_decimals() {
        assert_eq!(parse_magnitude(Some("6.5")), Some(6.5));
        assert_eq!(parse_magnitude(Some("4.7")), Some(4.7));
        assert_eq!(parse_magnitude(Some("$2.5K")), Some(2500.0));
        assert_eq!(parse_magnitude(Some("6.5%")), None);
        assert_eq!(parse_magnitude(Some("n/a")), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date(Some("2024-03-15")), expected);
        assert_eq!(parse_date(Some("03/15/2024")), expected);
        assert_eq!(parse_date(Some("3/15/24")), expected);
        assert_eq!(parse_date(Some("2024/03/15")), expected);
        assert_eq!(parse_date(Some("March 15, 2024")), expected);
        assert_eq!(parse_date(Some("Mar 15, 2024")), expected);
        assert_eq!(parse_date(Some("2024-03-15T10:30:00Z")), expected);
        assert_eq!(parse_date(Some("2024-03")), NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_parse_date_garbage_is_none() {
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(Some("2024-13-45")), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(Some("Katy, Cypress,,  Spring ")),
            vec!["Katy", "Cypress", "Spring"]
        );
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn test_status_to_phase() {
        assert_eq!(map_status_to_phase(Some("Under Construction")), ProjectPhase::UnderConstruction);
        assert_eq!(map_status_to_phase(Some("Completed 2023")), ProjectPhase::Completed);
        assert_eq!(map_status_to_phase(Some("Approved")), ProjectPhase::Approved);
        assert_eq!(map_status_to_phase(Some("In Planning")), ProjectPhase::Planning);
        assert_eq!(map_status_to_phase(Some("something else")), ProjectPhase::Planning);
        assert_eq!(map_status_to_phase(None), ProjectPhase::Planning);
    }
}
