//! Appender implementations

pub mod console;
pub mod file;
pub mod http;
pub mod network;
pub mod rolling_file;

pub use console::ConsoleAppender;
pub use file::SingleFileAppender;
pub use http::{HttpAppender, HttpClient, HttpTransport};
pub use network::{Endpoint, NetworkPushAppender, PushTransport, TcpPushTransport};
pub use rolling_file::{RollFileAppender, DEFAULT_MAX_SIZE_MIB};

pub use crate::core::Appender;

use crate::core::{AppenderId, Formatter, LogEvent, LoggerError, Result};
use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

/// Render an event with the appender's formatter
pub(crate) fn render(
    formatter: Option<&Arc<Formatter>>,
    id: &AppenderId,
    event: &LogEvent,
) -> Result<String> {
    formatter
        .map(|formatter| formatter.format(event))
        .ok_or_else(|| LoggerError::writer(format!("No formatter attached to {}", id)))
}

/// Connect to the first reachable address of `host:port`, waiting at most
/// `timeout` for each candidate address
pub(crate) fn connect_with_timeout(
    host: &str,
    port: u16,
    timeout: Duration,
) -> io::Result<TcpStream> {
    let mut last_error = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address found for {}:{}", host, port),
        )
    }))
}
