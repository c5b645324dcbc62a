use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
pub const DATE_FORMAT: &str = "%d.%m.%Y";

pub fn get_current_datetime() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Week label used to group logs and payouts, e.g. `KW42/2026`.
///
/// Uses the ISO week-year, so 2024-12-30 belongs to `KW1/2025`.
pub fn week_key(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("KW{}/{}", iso.week(), iso.year())
}

pub fn current_week_key() -> String {
    week_key(get_current_datetime().date())
}

pub fn format_timestamp(datetime: NaiveDateTime) -> String {
    datetime.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

pub fn parse_date_string(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
        .map_err(|_| anyhow::anyhow!("Invalid date format. Use DD.MM.YYYY"))
}

pub fn format_time(datetime: NaiveDateTime) -> String {
    datetime.format("%H:%M:%S").to_string()
}
