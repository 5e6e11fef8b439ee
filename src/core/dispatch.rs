//! Dispatch queue and worker thread
//!
//! Producers push [`LogTask`]s into an unbounded FIFO; a single worker thread
//! drains it and hands each task to a [`Logger`]. Producers only ever wait for
//! the queue lock, never for destination I/O.
//!
//! The stop signal travels through the same FIFO as the tasks, so everything
//! enqueued before [`LogProducer::stop`] is delivered before the worker exits.
//! Enqueueing and stopping are serialised by one lock, so no task can land
//! behind the stop marker.
//!
//! ```no_run
//! use fanout_logger::prelude::*;
//!
//! let logger = Logger::builder().file("app.log").build()?;
//! let dispatched = run_dispatcher(&logger, |producer| {
//!     producer.log(Severity::Info, "service started").ok();
//!     producer.log(Severity::Error, "lost connection to database").ok();
//! })?;
//! # Ok::<(), LoggerError>(())
//! ```

use super::{
    error::{panic_message, LoggerError, Result},
    log_level::Severity,
    log_task::LogTask,
    logger::Logger,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};

/// Name given to the worker thread
pub const WORKER_THREAD_NAME: &str = "log-dispatch";

enum Command {
    Log(LogTask),
    Stop,
}

struct Shared {
    stopped: RwLock<bool>,
    sender: Sender<Command>,
}

/// Cloneable producer handle onto the dispatch queue.
#[derive(Clone)]
pub struct LogProducer {
    shared: Arc<Shared>,
}

/// Consumer side of the dispatch queue.
pub struct DispatchWorker {
    receiver: Receiver<Command>,
}

/// Create a connected producer / worker pair.
pub fn channel() -> (LogProducer, DispatchWorker) {
    let (sender, receiver) = unbounded();
    let producer = LogProducer {
        shared: Arc::new(Shared {
            stopped: RwLock::new(false),
            sender,
        }),
    };
    (producer, DispatchWorker { receiver })
}

impl LogProducer {
    /// Append a task to the queue.
    ///
    /// Fails with [`LoggerError::DispatcherStopped`] once the stop signal was sent.
    pub fn enqueue(&self, task: LogTask) -> Result<()> {
        let stopped = self.shared.stopped.read();
        if *stopped {
            return Err(LoggerError::DispatcherStopped);
        }
        self.shared
            .sender
            .send(Command::Log(task))
            .map_err(|_| LoggerError::DispatcherStopped)
    }

    pub fn log(&self, level: Severity, message: impl Into<String>) -> Result<()> {
        self.enqueue(LogTask::new(message, level))
    }

    /// Signal the worker to exit once everything already queued is dispatched.
    ///
    /// Calling this more than once has no further effect.
    pub fn stop(&self) {
        let mut stopped = self.shared.stopped.write();
        if !*stopped {
            *stopped = true;
            // A disconnected worker has nothing left to drain
            let _ = self.shared.sender.send(Command::Stop);
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.shared.stopped.read()
    }

    /// Number of queue entries not yet picked up by the worker.
    pub fn pending(&self) -> usize {
        self.shared.sender.len()
    }
}

impl DispatchWorker {
    /// Drain the queue into `logger` until the stop marker arrives or every
    /// producer is gone. Returns the number of tasks dispatched.
    pub fn run(self, logger: &Logger) -> u64 {
        tracing::debug!(thread = WORKER_THREAD_NAME, "dispatch worker started");

        let mut dispatched = 0u64;
        for command in self.receiver.iter() {
            match command {
                Command::Log(task) => {
                    logger.log(task.level, &task.message);
                    logger.metrics().record_dispatched();
                    dispatched += 1;
                }
                Command::Stop => break,
            }
        }

        tracing::debug!(dispatched, "dispatch worker stopped");
        dispatched
    }
}

/// A running worker thread bound to a [`thread::scope`].
///
/// The scope guarantees the worker never outlives the borrowed [`Logger`].
/// Dropping the dispatcher sends the stop signal and joins the worker.
pub struct Dispatcher<'scope> {
    producer: LogProducer,
    handle: Option<ScopedJoinHandle<'scope, u64>>,
}

impl<'scope> Dispatcher<'scope> {
    pub fn spawn<'env>(scope: &'scope Scope<'scope, 'env>, logger: &'env Logger) -> Result<Self> {
        let (producer, worker) = channel();
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn_scoped(scope, move || worker.run(logger))
            .map_err(|e| {
                LoggerError::io_operation("spawning dispatch worker", "thread creation failed", e)
            })?;

        Ok(Self {
            producer,
            handle: Some(handle),
        })
    }

    pub fn producer(&self) -> LogProducer {
        self.producer.clone()
    }

    /// Send the stop signal and wait for the worker to drain the queue.
    ///
    /// Returns how many tasks the worker dispatched.
    pub fn shutdown(mut self) -> Result<u64> {
        self.producer.stop();
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|panic_info| LoggerError::WorkerPanicked(panic_message(panic_info.as_ref()))),
            None => Ok(0),
        }
    }
}

impl Drop for Dispatcher<'_> {
    fn drop(&mut self) {
        self.producer.stop();
        if let Some(handle) = self.handle.take() {
            if let Err(panic_info) = handle.join() {
                tracing::error!(
                    panic = %panic_message(panic_info.as_ref()),
                    "dispatch worker panicked during shutdown"
                );
            }
        }
    }
}

/// Run `body` with a producer feeding a dispatch worker for `logger`.
///
/// The worker is spawned before `body` runs; afterwards the stop signal is
/// sent and the worker joined, so every task enqueued inside `body` has
/// reached the logger by the time this returns.
pub fn run<R>(logger: &Logger, body: impl FnOnce(&LogProducer) -> R) -> Result<R> {
    thread::scope(|scope| {
        let dispatcher = Dispatcher::spawn(scope, logger)?;
        let producer = dispatcher.producer();
        let output = body(&producer);
        dispatcher.shutdown()?;
        Ok(output)
    })
}
