//! Brazilian (dd/mm/yyyy) and ISO date handling plus month arithmetic.

use chrono::{Datelike, Months, NaiveDate};

/// Apply the dd/mm/yyyy typing mask: digits only, at most 8, slashes inserted.
pub fn normalize_typed_date(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(8).collect();
    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}/{}", &digits[..2], &digits[2..]),
        _ => format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..]),
    }
}

/// Parse a complete `d/m/yyyy` date, rejecting days that do not exist in the month.
pub fn parse_br_date(input: &str) -> Option<NaiveDate> {
    let mut parts = input.split('/');
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if !all_digits(day, 1..=2) || !all_digits(month, 1..=2) || !all_digits(year, 4..=4) {
        return None;
    }

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;

    if !(1..=12).contains(&month) {
        return None;
    }
    if day < 1 || day > days_in_month(year, month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn all_digits(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Re-display a typed date with zero padding, `None` if it is not a valid date.
pub fn normalize_br_date(input: &str) -> Option<String> {
    parse_br_date(input).map(format_br_date)
}

pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse the date part of `yyyy-mm-dd` or `yyyy-mm-ddThh:mm:ss...`
pub fn parse_iso_date_prefix(input: &str) -> Option<NaiveDate> {
    let date_part = input.split('T').next()?.trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date,
        None => return 0,
    };
    match first.checked_add_months(Months::new(1)) {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}

/// Move `months` months forward from the anchor's month and land on `day`,
/// clamped to the last day of the target month.
///
/// The anchor's own day is ignored, so repeated calls from the same anchor
/// never drift (31 Jan -> 28 Feb -> 31 Mar).
pub fn add_months_clamped(anchor: NaiveDate, months: u32, day: u32) -> Option<NaiveDate> {
    let first = anchor.with_day(1)?.checked_add_months(Months::new(months))?;
    let last = days_in_month(first.year(), first.month());
    first.with_day(day.clamp(1, last))
}
