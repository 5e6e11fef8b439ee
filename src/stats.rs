//! Statistics over received log lines
//!
//! Consumer-side companion of the socket destination: counts lines per
//! severity marker, tracks line lengths, and keeps a one-hour sliding window
//! of arrival times.
//!
//! Two report triggers keep separate bookkeeping: a count-triggered report
//! restarts the every-N counter and clears the changed flag, while a
//! timer-triggered report only clears the changed flag, so the every-N
//! schedule is not shifted by the timer.

use crate::core::Severity;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead};

/// Width of the "recent messages" window, in seconds
pub const RECENT_WINDOW_SECS: i64 = 60 * 60;

#[derive(Debug, Default)]
pub struct StatsCollector {
    total: u64,
    errors: u64,
    warnings: u64,
    infos: u64,
    min_len: Option<usize>,
    max_len: Option<usize>,
    avg_len: f64,
    recent: VecDeque<DateTime<Utc>>,
    since_report: u64,
    changed: bool,
}

/// Point-in-time view of a [`StatsCollector`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub total_messages: u64,
    pub errors: u64,
    pub warnings: u64,
    pub infos: u64,
    pub messages_last_hour: usize,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub avg_length: Option<f64>,
}

/// Severity marker found in a formatted line, if any.
/// Feed every non-empty line of `reader` to `on_line`.
///
/// Lines are split on `\n` as raw bytes; a trailing `\r` is dropped and
/// invalid UTF-8 is replaced rather than ending the stream. Returns the number
/// of lines delivered once EOF is reached.
pub fn for_each_line<R: BufRead>(mut reader: R, mut on_line: impl FnMut(&str)) -> io::Result<u64> {
    let mut buf = Vec::new();
    let mut delivered = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(delivered);
        }

        let mut end = buf.len();
        while end > 0 && matches!(buf[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        if end == 0 {
            continue;
        }

        let line = String::from_utf8_lossy(&buf[..end]);
        on_line(&*line);
        delivered += 1;
    }
}

pub fn detect_severity(line: &str) -> Option<Severity> {
    Severity::ALL
        .into_iter()
        .find(|level| line.contains(&format!("[{}]", level.as_str())))
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: &str) {
        self.record_at(line, Utc::now());
    }

    pub fn record_at(&mut self, line: &str, at: DateTime<Utc>) {
        self.total += 1;
        self.since_report += 1;
        self.changed = true;

        let len = line.len();
        self.min_len = Some(self.min_len.map_or(len, |min| min.min(len)));
        self.max_len = Some(self.max_len.map_or(len, |max| max.max(len)));
        self.avg_len += (len as f64 - self.avg_len) / self.total as f64;

        match detect_severity(line) {
            Some(Severity::Error) => self.errors += 1,
            Some(Severity::Warning) => self.warnings += 1,
            Some(Severity::Info) => self.infos += 1,
            None => {}
        }

        self.recent.push_back(at);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Lines recorded since the last [`mark_count_reported`](Self::mark_count_reported).
    pub fn since_report(&self) -> u64 {
        self.since_report
    }

    /// Whether anything was recorded since the last report.
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Bookkeeping after a report triggered by the every-N counter.
    pub fn mark_count_reported(&mut self) {
        self.since_report = 0;
        self.changed = false;
    }

    /// Bookkeeping after a report triggered by the timer.
    pub fn mark_interval_reported(&mut self) {
        self.changed = false;
    }

    /// Drop arrivals older than the window and take a snapshot.
    pub fn snapshot_at(&mut self, now: DateTime<Utc>) -> StatsSnapshot {
        let window = Duration::seconds(RECENT_WINDOW_SECS);
        while let Some(oldest) = self.recent.front() {
            if now - *oldest >= window {
                self.recent.pop_front();
            } else {
                break;
            }
        }

        StatsSnapshot {
            total_messages: self.total,
            errors: self.errors,
            warnings: self.warnings,
            infos: self.infos,
            messages_last_hour: self.recent.len(),
            min_length: self.min_len,
            max_length: self.max_len,
            avg_length: (self.total > 0).then_some(self.avg_len),
        }
    }

    pub fn snapshot(&mut self) -> StatsSnapshot {
        self.snapshot_at(Utc::now())
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== Statistics =====")?;
        writeln!(f, "Total messages: {}", self.total_messages)?;
        writeln!(
            f,
            "Errors: {}, Warnings: {}, Infos: {}",
            self.errors, self.warnings, self.infos
        )?;
        writeln!(f, "Messages in last hour: {}", self.messages_last_hour)?;
        match (self.min_length, self.max_length, self.avg_length) {
            (Some(min), Some(max), Some(avg)) => {
                writeln!(f, "Min length: {}", min)?;
                writeln!(f, "Max length: {}", max)?;
                writeln!(f, "Avg length: {:.2}", avg)?;
            }
            _ => writeln!(f, "No messages yet.")?,
        }
        write!(f, "======================")
    }
}
