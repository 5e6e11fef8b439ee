//! Producer-side parsing of interactive input lines
//!
//! A line may carry a `level:` prefix (`error`, `warning` or `info`, any case);
//! without a recognised prefix the whole line is logged at the default level.

use crate::core::{LogTask, Severity};

/// Line that ends an interactive session
pub const EXIT_COMMAND: &str = "exit";

/// Turn one input line into a task.
///
/// # Examples
///
/// ```
/// use fanout_logger::input::parse_input_line;
/// use fanout_logger::Severity;
///
/// let task = parse_input_line("WARNING:disk at 91%", Severity::Info);
/// assert_eq!(task.level, Severity::Warning);
/// assert_eq!(task.message, "disk at 91%");
///
/// let task = parse_input_line("time: 12:00", Severity::Info);
/// assert_eq!(task.level, Severity::Info);
/// assert_eq!(task.message, "time: 12:00");
/// ```
pub fn parse_input_line(line: &str, default_level: Severity) -> LogTask {
    if let Some((prefix, rest)) = line.split_once(':') {
        if let Ok(level) = prefix.parse::<Severity>() {
            return LogTask::new(rest, level);
        }
    }
    LogTask::new(line, default_level)
}

pub fn is_exit_command(line: &str) -> bool {
    line == EXIT_COMMAND
}
