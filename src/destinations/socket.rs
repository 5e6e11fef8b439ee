//! Socket destination for remote logging
//!
//! Sends each formatted line over a TCP connection opened once at
//! construction. A failed connect or send leaves the destination permanently
//! disconnected; no reconnection is attempted.

use crate::core::{Destination, LoggerError, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Upper bound on a single blocked send before the peer is considered gone
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Check that `port` is usable as a TCP destination port (1..=65535).
pub fn validate_port(port: u32) -> Result<u16> {
    match u16::try_from(port) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(LoggerError::InvalidPort(port)),
    }
}

/// Destination that writes newline-delimited lines to a TCP peer
///
/// # Example
///
/// ```no_run
/// use fanout_logger::destinations::SocketDestination;
/// use fanout_logger::Destination;
///
/// let socket = SocketDestination::connect("127.0.0.1", 5000);
/// if socket.is_connected() {
///     socket.write_log_line("2024-01-01 00:00:00 [Info] hello").ok();
/// }
/// ```
pub struct SocketDestination {
    host: String,
    port: u16,
    stream: Mutex<Option<TcpStream>>,
    connected: AtomicBool,
}

impl SocketDestination {
    /// Resolve `host` to an IPv4 address and connect once.
    ///
    /// Any failure leaves the destination disconnected instead of returning an error.
    pub fn connect(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        match Self::open_stream(&host, port) {
            Ok(stream) => Self::from_stream(host, port, Some(stream)),
            Err(e) => {
                tracing::warn!(
                    destination = "socket",
                    host = %host,
                    port,
                    error = %e,
                    "connection failed, destination disabled"
                );
                Self::from_stream(host, port, None)
            }
        }
    }

    /// Like [`connect`](Self::connect) but returns the failure to the caller.
    pub fn try_connect(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        let stream = Self::open_stream(&host, port)?;
        Ok(Self::from_stream(host, port, Some(stream)))
    }

    fn from_stream(host: String, port: u16, stream: Option<TcpStream>) -> Self {
        let connected = stream.is_some();
        Self {
            host,
            port,
            stream: Mutex::new(stream),
            connected: AtomicBool::new(connected),
        }
    }

    fn resolve_ipv4(host: &str, port: u16) -> Result<SocketAddrV4> {
        let addrs = (host, port).to_socket_addrs().map_err(|e| {
            LoggerError::address_resolution(host, e.to_string())
        })?;

        addrs
            .filter_map(|addr| match addr {
                SocketAddr::V4(v4) => Some(v4),
                SocketAddr::V6(_) => None,
            })
            .next()
            .ok_or_else(|| LoggerError::address_resolution(host, "no IPv4 address found"))
    }

    fn open_stream(host: &str, port: u16) -> Result<TcpStream> {
        let addr = Self::resolve_ipv4(host, port)?;
        let stream = TcpStream::connect(addr).map_err(|e| {
            LoggerError::io_operation("connecting log socket", format!("connect to {} failed", addr), e)
        })?;

        // Low latency per line, and a bounded wait on a stalled peer
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(DEFAULT_WRITE_TIMEOUT))?;

        tracing::debug!(destination = "socket", peer = %addr, "connected");
        Ok(stream)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address of the connected peer, if still connected.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream
            .lock()
            .as_ref()
            .and_then(|stream| stream.peer_addr().ok())
    }
}

impl Destination for SocketDestination {
    fn write_log_line(&self, line: &str) -> Result<()> {
        let mut guard = self.stream.lock();
        if !self.is_connected() {
            return Ok(());
        }
        let Some(stream) = guard.as_mut() else {
            return Ok(());
        };

        let mut out = String::with_capacity(line.len() + 1);
        out.push_str(line);
        if !out.ends_with('\n') {
            out.push('\n');
        }

        // write_all resumes after partial sends until the buffer is drained
        if let Err(e) = stream.write_all(out.as_bytes()) {
            let _ = stream.shutdown(Shutdown::Both);
            *guard = None;
            self.connected.store(false, Ordering::Release);
            tracing::warn!(
                destination = "socket",
                host = %self.host,
                port = self.port,
                error = %e,
                "send failed, destination disabled"
            );
            return Err(LoggerError::io_operation(
                "sending log line",
                format!("peer {}:{} stopped accepting data", self.host, self.port),
                e,
            ));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "socket"
    }

    fn is_active(&self) -> bool {
        self.is_connected()
    }
}

impl Drop for SocketDestination {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.get_mut().take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.connected.store(false, Ordering::Release);
    }
}
