use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

static MONTH_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+ \d{1,2}, \d{4}").unwrap());
static ISO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}\b").unwrap());

/// Parse the first recognizable birth date inside `raw`.
///
/// Formats are tried in order: `May 9, 1998`, `1998-05-09`, then a bare year
/// which is read as January 1st.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(m) = MONTH_NAME_RE.find(raw) {
        if let Ok(d) = NaiveDate::parse_from_str(m.as_str(), "%B %d, %Y") {
            return Some(d);
        }
    }
    if let Some(m) = ISO_RE.find(raw) {
        if let Ok(d) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d") {
            return Some(d);
        }
    }
    YEAR_RE
        .find(raw)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
}

/// Whole years between a birth date string and `as_of`. `None` when the date
/// can't be read or lies after `as_of`.
pub fn compute_age(raw: &str, as_of: NaiveDate) -> Option<u32> {
    let birth = parse_birth_date(raw)?;
    let mut age = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

// ── Tests ──
