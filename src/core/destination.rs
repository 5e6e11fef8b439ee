//! Destination trait for formatted log lines

use super::error::Result;

/// A sink that accepts one already-formatted line at a time.
///
/// Implementations guard their own state, so `write_log_line` takes `&self`
/// and may be called from any thread. An inert destination (file that never
/// opened, socket that lost its peer) returns `Ok(())` without doing anything.
/// Errors are reported back to the [`Logger`](crate::Logger), which records
/// them and keeps going with the remaining destinations.
pub trait Destination: Send + Sync {
    fn write_log_line(&self, line: &str) -> Result<()>;

    fn name(&self) -> &str;

    /// Whether writes still reach the underlying sink.
    fn is_active(&self) -> bool {
        true
    }
}
