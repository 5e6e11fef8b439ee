//! Logging macros for ergonomic log message formatting.
//!
//! These macros accept anything with a `log(level, message)` method, so they
//! work both on a [`Logger`](crate::Logger) directly and on a
//! [`LogProducer`](crate::LogProducer) feeding the dispatch worker.
//!
//! # Examples
//!
//! ```
//! use fanout_logger::prelude::*;
//! use fanout_logger::{error, info};
//!
//! let logger = Logger::new(Severity::Info);
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! error!(logger, "Bind to {} failed: {}", port, "address in use");
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::new(Severity::Info);
/// use fanout_logger::log;
/// log!(logger, Severity::Info, "Simple message");
/// log!(logger, Severity::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($target:expr, $level:expr, $($arg:tt)+) => {
        $target.log($level, format!($($arg)+))
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::new(Severity::Info);
/// use fanout_logger::error;
/// error!(logger, "Database connection failed");
/// error!(logger, "Failed to process request: {}", "timeout");
/// ```
#[macro_export]
macro_rules! error {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Error, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::new(Severity::Info);
/// use fanout_logger::warning;
/// warning!(logger, "Memory usage at {}%", 91);
/// ```
#[macro_export]
macro_rules! warning {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Warning, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use fanout_logger::prelude::*;
/// # let logger = Logger::new(Severity::Info);
/// use fanout_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "User {} logged in", "alice");
/// ```
#[macro_export]
macro_rules! info {
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::Severity::Info, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Destination, Logger, Result, Severity};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct MemoryDestination {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl Destination for MemoryDestination {
        fn write_log_line(&self, line: &str) -> Result<()> {
            self.lines.lock().push(line.to_string());
            Ok(())
        }

        fn name(&self) -> &str {
            "memory"
        }
    }

    #[test]
    fn test_macros_on_logger() {
        let memory = MemoryDestination::default();
        let logger = Logger::new(Severity::Warning);
        logger.add_destination(memory.clone());

        error!(logger, "code {}", 500);
        warning!(logger, "{} retries left", 2);
        info!(logger, "filtered {}", "out");

        let lines = memory.lines.lock();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[Error] code 500"));
        assert!(lines[1].ends_with("[Warning] 2 retries left"));
    }

    #[test]
    fn test_macros_on_producer() {
        let (producer, _worker) = crate::core::dispatch::channel();
        assert!(info!(producer, "queued {}", 1).is_ok());
        assert_eq!(producer.pending(), 1);
    }
}
