//! # Fanout Logger
//!
//! Severity-filtered logging that fans every accepted line out to several
//! independently failing destinations.
//!
//! ## Features
//!
//! - **Three severities**: `Error`, `Warning`, `Info`, filtered against a runtime threshold
//! - **Multiple Destinations**: append-only file and TCP socket, plus custom sinks
//! - **Failure Isolation**: a broken destination goes quiet without affecting the others
//! - **Dispatch Worker**: producers enqueue, one thread performs all destination I/O

pub mod core;
pub mod destinations;
pub mod input;
pub mod macros;
pub mod stats;

pub mod prelude {
    pub use crate::core::dispatch::run as run_dispatcher;
    pub use crate::core::{
        Destination, Dispatcher, LogProducer, LogTask, Logger, LoggerBuilder, LoggerError,
        LoggerMetrics, Result, Severity,
    };
    pub use crate::destinations::{FileDestination, SocketDestination};
}

pub use crate::core::dispatch::run as run_dispatcher;
pub use crate::core::{
    format_line, format_line_at, Destination, DispatchWorker, Dispatcher, LogProducer, LogTask,
    Logger, LoggerBuilder, LoggerError, LoggerMetrics, Result, Severity, TIMESTAMP_FORMAT,
    WORKER_THREAD_NAME,
};
pub use destinations::{FileDestination, SocketDestination};
