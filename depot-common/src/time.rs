//! Timestamp formatting for operation records and log lines
//!
//! Both the audit log and broadcast events carry wall-clock timestamps in a
//! fixed format. The display timezone is the server's local timezone,
//! captured per timestamp.

use chrono::Local;

/// Timestamp format used in log lines and operation records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local wall-clock time, formatted as `YYYY-MM-DD HH:mm:ss`
#[must_use]
pub fn now_stamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
