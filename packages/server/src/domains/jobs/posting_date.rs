//! Posting-date extraction from free-form job description text.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

// Day-month-year and year-month-day, numeric, with `/` or `-` separators.
static DAY_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{4})").unwrap());
static YEAR_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[/-](\d{1,2})[/-](\d{1,2})").unwrap());

/// Scan description text for a posting date.
///
/// Only the first match of each pattern is considered; a token that is not
/// a valid calendar date (month 13, day 32) is skipped and the scan moves
/// on to the next pattern. Returns `None` when nothing usable is found, in
/// which case the caller falls back to the current date.
pub fn extract_posting_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = DAY_FIRST.captures(text) {
        let (day, month, year) = (field(&caps, 1), field(&caps, 2), field(&caps, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = YEAR_FIRST.captures(text) {
        let (year, month, day) = (field(&caps, 1), field(&caps, 2), field(&caps, 3));
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

fn field<T: std::str::FromStr + Default>(caps: &regex::Captures<'_>, index: usize) -> T {
    // The capture groups are all-digit by construction.
    caps[index].parse().unwrap_or_default()
}
