//! Core logger types and traits

pub mod destination;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod log_level;
pub mod log_task;
pub mod logger;
pub mod metrics;

pub use destination::Destination;
pub use dispatch::{DispatchWorker, Dispatcher, LogProducer, WORKER_THREAD_NAME};
pub use error::{LoggerError, Result};
pub use format::{format_line, format_line_at, TIMESTAMP_FORMAT};
pub use log_level::Severity;
pub use log_task::LogTask;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
