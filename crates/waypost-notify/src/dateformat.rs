//! Event timestamp formatting

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

/// `HH:MM` for times on the same day as `now`, `YYYY-MM-DD HH:MM` otherwise
pub fn format_date<Tz>(when: &DateTime<Tz>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if when.date_naive() == now.date_naive() {
        when.format("%H:%M").to_string()
    } else {
        when.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// Format an epoch millisecond timestamp in local time
pub fn format_local(timestamp_ms: i64) -> String {
    let when = Utc
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .unwrap_or_default()
        .with_timezone(&Local);
    format_date(&when, &Local::now())
}
