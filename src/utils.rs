//! General utilities.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Get current Unix timestamp in seconds, respecting `SOURCE_DATE_EPOCH`.
///
/// When `SOURCE_DATE_EPOCH` is set, returns that value instead of the actual
/// current time, so relative times in test snapshots stay deterministic.
pub fn get_now() -> i64 {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|val| val.parse::<i64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or_default()
        })
}

/// Compact age of a timestamp: `now`, `5m`, `3h`, `12d`.
///
/// Empty when there is no timestamp.
pub fn format_time_ago(time: Option<DateTime<Utc>>) -> String {
    format_time_ago_at(time, get_now())
}

fn format_time_ago_at(time: Option<DateTime<Utc>>, now: i64) -> String {
    let Some(time) = time else {
        return String::new();
    };
    let seconds = now - time.timestamp();
    if seconds < MINUTE {
        "now".to_string()
    } else if seconds < HOUR {
        format!("{}m", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{}h", seconds / HOUR)
    } else {
        format!("{}d", seconds / DAY)
    }
}
