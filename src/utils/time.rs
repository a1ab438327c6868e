//! Time and timestamp utilities

use chrono::{Local, NaiveDateTime, Timelike};

/// Current local wall-clock time truncated to whole seconds
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Histogram key for a timestamp: the instant truncated to the hour
pub fn hour_bucket(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:00").to_string()
}

/// Compact stamp used in archive file names, e.g. `20260314T091507`
pub fn archive_stamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y%m%dT%H%M%S").to_string()
}
