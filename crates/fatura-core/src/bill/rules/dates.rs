//! Date and reference-month helpers.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, MONTH_TOKEN};

/// Parse a `DD/MM/YYYY` due date.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let caps = DATE_DMY.captures(s.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Month number for a three-letter month token (Portuguese or English).
pub fn month_number(token: &str) -> Option<u32> {
    let number = match token.trim().to_uppercase().as_str() {
        "JAN" => 1,
        "FEV" | "FEB" => 2,
        "MAR" => 3,
        "ABR" | "APR" => 4,
        "MAI" | "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AGO" | "AUG" => 8,
        "SET" | "SEP" => 9,
        "OUT" | "OCT" => 10,
        "NOV" => 11,
        "DEZ" | "DEC" => 12,
        _ => return None,
    };
    Some(number)
}

/// Year carried by a `MMM/YYYY` reference month.
pub fn year_from_month(month: &str) -> Option<i32> {
    let caps = MONTH_TOKEN.captures(month.trim())?;
    caps[2].parse().ok()
}

/// Pick the reference year: an explicit year wins over the month token.
pub fn resolve_year(explicit: Option<&str>, month: &str) -> Option<i32> {
    explicit
        .and_then(|s| s.trim().parse::<i32>().ok())
        .filter(|y| (1900..=2100).contains(y))
        .or_else(|| year_from_month(month))
}
