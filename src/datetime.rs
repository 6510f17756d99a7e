//! Dates and times picked by the calendar and time boxes.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Timelike, Weekday};

/// The date a calendar opens on. Zero (or out of range) components are
/// taken from `today`; a day past the end of the month is pulled back to
/// its last day.
pub fn initial_date(day: u32, month: u32, year: i32, today: NaiveDate) -> NaiveDate {
    let year = if year > 0 { year } else { today.year() };
    let month = if (1..=12).contains(&month) { month } else { today.month() };
    let day = if day > 0 { day } else { today.day() };
    let last = days_in_month(year, month);
    NaiveDate::from_ymd_opt(year, month, day.min(last)).unwrap_or(today)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}

/// `date` moved by `days`, or unchanged at the ends of the calendar.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let moved = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    moved.unwrap_or(date)
}

/// `date` moved by `months`, keeping the day where the month allows it.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let moved = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    moved.unwrap_or(date)
}

/// Cells before day 1 in a grid whose weeks start on Sunday.
pub fn leading_blanks(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1).map_or(0, |d| d.weekday().num_days_from_sunday())
}

/// ISO week number of row `row` of the month grid, taken from the Monday
/// of that row.
pub fn week_number(year: i32, month: u32, row: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let sunday = shift_days(first, -i64::from(first.weekday().num_days_from_sunday()));
    let monday = shift_days(sunday, i64::from(row) * 7 + 1);
    monday.iso_week().week()
}

/// Short weekday names, Sunday first.
pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// `DD/MM/YYYY` and a newline.
pub fn format_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}\n", date.day(), date.month(), date.year())
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month.checked_sub(1).and_then(|m| NAMES.get(m as usize)).copied().unwrap_or("")
}

/// The time a time box opens on: the given hours, minutes and seconds
/// clamped to a clock, or `now` when none were given.
pub fn initial_time(given: Option<(u32, u32, u32)>, now: NaiveTime) -> [u32; 3] {
    match given {
        Some((h, m, s)) => [h.min(23), m.min(59), s.min(59)],
        None => [now.hour(), now.minute(), now.second()],
    }
}

/// `HH:MM:SS` and a newline.
pub fn format_time(time: [u32; 3]) -> String {
    format!("{:02}:{:02}:{:02}\n", time[0], time[1], time[2])
}
