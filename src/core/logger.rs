//! Main logger implementation

use super::{
    destination::Destination,
    error::{panic_message, LoggerError, Result},
    format::format_line,
    log_level::Severity,
    metrics::LoggerMetrics,
};
use crate::destinations::{socket::validate_port, FileDestination, SocketDestination};
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

/// Filters messages by severity and fans accepted lines out to every destination.
///
/// The threshold and the destination list sit behind separate locks, and the
/// list lock is released before any destination is written to, so a slow
/// destination never holds up `set_level` or `add_destination`.
pub struct Logger {
    threshold: RwLock<Severity>,
    destinations: RwLock<Vec<Arc<dyn Destination>>>,
    metrics: LoggerMetrics,
}

impl Logger {
    #[must_use]
    pub fn new(threshold: Severity) -> Self {
        Self {
            threshold: RwLock::new(threshold),
            destinations: RwLock::new(Vec::new()),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Logger with one file destination and, when given, one socket destination.
    ///
    /// Destinations that fail to open are attached in their inert state; only
    /// an invalid port is reported as an error.
    pub fn with_file_and_optional_socket(
        path: impl Into<PathBuf>,
        threshold: Severity,
        socket: Option<(&str, u16)>,
    ) -> Result<Self> {
        let mut builder = Self::builder().level(threshold).file(path);
        if let Some((host, port)) = socket {
            builder = builder.socket(host, port);
        }
        builder.build()
    }

    pub fn set_level(&self, threshold: Severity) {
        *self.threshold.write() = threshold;
    }

    pub fn level(&self) -> Severity {
        *self.threshold.read()
    }

    pub fn add_destination<D: Destination + 'static>(&self, destination: D) {
        self.push_destination(Arc::new(destination));
    }

    fn push_destination(&self, destination: Arc<dyn Destination>) {
        self.destinations.write().push(destination);
    }

    /// Attach a file destination. An unopenable file yields an inert destination.
    pub fn add_file_destination(&self, path: impl Into<PathBuf>) {
        self.add_destination(FileDestination::open(path));
    }

    /// Attach a socket destination. An unreachable peer yields an inert destination.
    pub fn add_socket_destination(&self, host: &str, port: u16) -> Result<()> {
        let port = validate_port(u32::from(port))?;
        self.add_destination(SocketDestination::connect(host, port));
        Ok(())
    }

    pub fn destination_count(&self) -> usize {
        self.destinations.read().len()
    }

    pub fn active_destination_count(&self) -> usize {
        let destinations = self.destinations.read().clone();
        destinations
            .iter()
            .filter(|destination| destination.is_active())
            .count()
    }

    /// Log `message` if `level` passes the current threshold.
    ///
    /// Never fails and never panics because of a destination.
    pub fn log(&self, level: Severity, message: impl AsRef<str>) {
        if !level.passes(self.level()) {
            self.metrics.record_filtered();
            return;
        }

        let line = format_line(message.as_ref(), level);
        self.metrics.record_accepted();

        let destinations = self.destinations.read().clone();
        for (idx, destination) in destinations.iter().enumerate() {
            self.write_isolated(idx, destination.as_ref(), &line);
        }
    }

    /// Log `message` at whatever level the threshold is currently set to.
    pub fn log_at_current_level(&self, message: impl AsRef<str>) {
        self.log(self.level(), message);
    }

    /// Write one line to one destination, containing errors and panics.
    fn write_isolated(&self, idx: usize, destination: &dyn Destination, line: &str) {
        if !destination.is_active() {
            return;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| destination.write_log_line(line)));
        match result {
            Ok(Ok(())) => {
                self.metrics.record_delivered();
            }
            Ok(Err(e)) => {
                self.metrics.record_destination_failure();
                tracing::warn!(
                    destination = destination.name(),
                    index = idx,
                    error = %e,
                    "destination write failed"
                );
            }
            Err(panic_info) => {
                self.metrics.record_destination_failure();
                tracing::error!(
                    destination = destination.name(),
                    index = idx,
                    panic = %panic_message(panic_info.as_ref()),
                    "destination panicked, other destinations continue"
                );
            }
        }
    }

    #[inline]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Severity::Error, message);
    }

    #[inline]
    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(Severity::Warning, message);
    }

    #[inline]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Severity::Info, message);
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use fanout_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .level(Severity::Warning)
    ///     .file("app.log")
    ///     .socket("127.0.0.1", 5000)
    ///     .build()
    ///     .expect("valid configuration");
    /// logger.error("disk failure");
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let failures = self.metrics.destination_failures();
        if failures > 0 {
            tracing::warn!(
                failures,
                failure_rate = self.metrics.failure_rate(),
                "logger shutting down after failed destination writes"
            );
        }
    }
}

enum PendingDestination {
    File(PathBuf),
    Socket { host: String, port: u16 },
    Custom(Arc<dyn Destination>),
}

/// Builder for constructing Logger with a fluent API
///
/// Destinations are attached in the order they were added. In strict mode a
/// file that cannot be opened or a socket that cannot connect fails `build`
/// instead of being attached inert.
pub struct LoggerBuilder {
    threshold: Severity,
    destinations: Vec<PendingDestination>,
    strict: bool,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            threshold: Severity::default(),
            destinations: Vec::new(),
            strict: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.destinations.push(PendingDestination::File(path.into()));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn socket(mut self, host: impl Into<String>, port: u16) -> Self {
        self.destinations.push(PendingDestination::Socket {
            host: host.into(),
            port,
        });
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn destination<D: Destination + 'static>(mut self, destination: D) -> Self {
        self.destinations
            .push(PendingDestination::Custom(Arc::new(destination)));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Result<Logger> {
        let logger = Logger::new(self.threshold);

        for pending in self.destinations {
            let destination: Arc<dyn Destination> = match pending {
                PendingDestination::File(path) if self.strict => {
                    Arc::new(FileDestination::try_open(path)?)
                }
                PendingDestination::File(path) => Arc::new(FileDestination::open(path)),
                PendingDestination::Socket { host, port } => {
                    if host.is_empty() {
                        return Err(LoggerError::config("SocketDestination", "empty host"));
                    }
                    let port = validate_port(u32::from(port))?;
                    if self.strict {
                        Arc::new(SocketDestination::try_connect(host, port)?)
                    } else {
                        Arc::new(SocketDestination::connect(host, port))
                    }
                }
                PendingDestination::Custom(destination) => destination,
            };
            logger.push_destination(destination);
        }

        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
