use chrono::{DateTime, Local, NaiveDateTime};

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MINUTES_IN_H: u32 = 60;
    pub const MINUTES_IN_D: u32 = 60 * 24;

    /// Candle timestamps on the wire and on the chart axis, e.g. `2024-11-04 09:15`.
    pub const CANDLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
    const CANDLE_TIME_FORMAT_SECS: &str = "%Y-%m-%d %H:%M:%S";

    /// Shorthand label for a timeframe width in minutes (e.g. `15m`, `1h`, `1d`).
    pub fn minutes_to_string(minutes: u32) -> String {
        match minutes {
            m if m > 0 && m % Self::MINUTES_IN_D == 0 => format!("{}d", m / Self::MINUTES_IN_D),
            m if m > 0 && m % Self::MINUTES_IN_H == 0 => format!("{}h", m / Self::MINUTES_IN_H),
            m => format!("{}m", m),
        }
    }
}

/// Parse a candle timestamp into epoch milliseconds.
/// Naive wall-clock strings (the backend's format) are taken as-is, without any timezone shift,
/// so hour/minute bucketing happens on the exchange's own clock.
pub fn parse_candle_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, TimeUtils::CANDLE_TIME_FORMAT) {
        return Some(naive.and_utc().timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, TimeUtils::CANDLE_TIME_FORMAT_SECS) {
        return Some(naive.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_local().and_utc().timestamp_millis())
}

/// Inverse of `parse_candle_timestamp`, minute precision.
pub fn format_candle_timestamp(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::CANDLE_TIME_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Floor to the start of the containing minute (drops seconds and millis).
pub fn truncate_to_minute(epoch_ms: i64) -> i64 {
    epoch_ms.div_euclid(TimeUtils::MS_IN_MIN) * TimeUtils::MS_IN_MIN
}

pub fn local_now_as_timestamp_ms() -> i64 {
    let now_local = Local::now();
    now_local.timestamp_millis()
}

pub fn how_many_seconds_ago(past_timestamp_ms: i64) -> i64 {
    // How many seconds ago was the event described by `past_timestamp_ms` ?
    let now_timestamp_ms = local_now_as_timestamp_ms();
    (now_timestamp_ms - past_timestamp_ms) / 1000
}
