//! Line formatting
//!
//! Every accepted message is rendered as
//! `YYYY-MM-DD HH:MM:SS [Level] message`, timestamped in local time with
//! whole-second resolution. The message is copied verbatim.

use super::log_level::Severity;
use chrono::{DateTime, Local, TimeZone};

/// strftime pattern for the leading timestamp
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a message using the current local time.
#[must_use]
pub fn format_line(message: &str, level: Severity) -> String {
    format_line_at(&Local::now(), message, level)
}

/// Format a message with an explicit timestamp.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use fanout_logger::{format_line_at, Severity};
///
/// let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(
///     format_line_at(&at, "disk almost full", Severity::Warning),
///     "2024-03-09 07:05:01 [Warning] disk almost full"
/// );
/// ```
#[must_use]
pub fn format_line_at<Tz>(timestamp: &DateTime<Tz>, message: &str, level: Severity) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} [{}] {}",
        timestamp.format(TIMESTAMP_FORMAT),
        level.as_str(),
        message
    )
}
