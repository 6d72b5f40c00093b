//! Permissive calendar-date parsing for the `last_review` column.
//!
//! Values that cannot be read as a date are reported as `None` and never as
//! an error; a single bad cell must not abort the whole run.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::Dataset;

/// Canonical output format.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a cell as a calendar date. Time components are dropped; RFC 3339
/// timestamps keep the date in their own offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_compact(s) {
        return Some(date);
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// `YYYYMMDD`
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render a parsed value; `None` becomes the empty missing marker.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(CANONICAL_FORMAT).to_string())
        .unwrap_or_default()
}

/// Reinterpret every `last_review` cell as a date. Returns how many cells
/// ended up missing.
pub fn normalize_last_review(dataset: &mut Dataset) -> usize {
    let mut missing = 0;
    for row in &mut dataset.rows {
        row.last_review = row.last_review.normalize();
        if row.last_review.as_date().is_none() {
            missing += 1;
        }
    }
    missing
}
