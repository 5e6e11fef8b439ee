//! File destination implementation

use crate::core::{Destination, LoggerError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends lines to a local file, flushing after every line.
///
/// If the file cannot be opened the destination stays usable but inert:
/// every write becomes a no-op.
pub struct FileDestination {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
    open: bool,
}

impl FileDestination {
    /// Open `path` in append mode, falling back to an inert destination on failure.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fanout_logger::destinations::FileDestination;
    /// use fanout_logger::Destination;
    ///
    /// let file = FileDestination::open("/var/log/app.log");
    /// if !file.is_open() {
    ///     eprintln!("logging to {} disabled", file.path().display());
    /// }
    /// ```
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let writer = match Self::open_append(&path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                tracing::warn!(
                    destination = "file",
                    path = %path.display(),
                    error = %e,
                    "failed to open log file, destination disabled"
                );
                None
            }
        };

        Self {
            path,
            open: writer.is_some(),
            writer: Mutex::new(writer),
        }
    }

    /// Open `path` in append mode, returning the error instead of degrading.
    pub fn try_open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = Self::open_append(&path).map_err(|e| {
            LoggerError::io_operation(
                "opening log file",
                format!("cannot open '{}' for appending", path.display()),
                e,
            )
        })?;

        Ok(Self {
            path,
            writer: Mutex::new(Some(BufWriter::new(file))),
            open: true,
        })
    }

    fn open_append(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fixed at construction; never waits on an in-flight write.
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Destination for FileDestination {
    fn write_log_line(&self, line: &str) -> Result<()> {
        let mut guard = self.writer.lock();
        let Some(writer) = guard.as_mut() else {
            return Ok(());
        };

        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::io_operation(
                    "writing log file",
                    format!("append to '{}' failed", self.path.display()),
                    e,
                )
            })
    }

    fn name(&self) -> &str {
        "file"
    }

    fn is_active(&self) -> bool {
        self.is_open()
    }
}

impl Drop for FileDestination {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.get_mut().as_mut() {
            let _ = writer.flush();
        }
    }
}
