//! Network push appender
//!
//! Publishes each rendered event as one message to a remote endpoint.
//! Delivery is fire and forget: a failed send is reported and the event is
//! not retried, but the connection is dialed again for the next event.

use super::{connect_with_timeout, render};
use crate::core::{Appender, AppenderId, Formatter, LogEvent, LoggerError, Result};
use std::fmt;
use std::io::{self, Write};
use std::net::TcpStream;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const IO_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Message transport used by [`NetworkPushAppender`]
pub trait PushTransport: Send {
    /// Send one complete message
    fn send(&mut self, payload: &[u8]) -> io::Result<()>;

    /// Whether a send can go out without dialing first
    fn is_connected(&self) -> bool {
        true
    }
}

/// A `scheme://host:port` address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: "tcp".to_string(),
            host: host.into(),
            port,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Identity of a push appender bound to this endpoint
    pub fn appender_id(&self) -> AppenderId {
        AppenderId::network_push(&self.scheme, &self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

impl FromStr for Endpoint {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: &str| LoggerError::config("endpoint", format!("'{}': {}", s, message));

        let (scheme, address) = s
            .split_once("://")
            .ok_or_else(|| invalid("expected scheme://host:port"))?;
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;
        if scheme.is_empty() || host.is_empty() {
            return Err(invalid("empty scheme or host"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;

        Ok(Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        })
    }
}

/// Length-prefixed frames over a TCP connection.
///
/// Each message is a 4-byte big-endian length followed by the payload. A
/// failed send drops the connection; the next send dials the endpoint again,
/// so delivery resumes once the collector is back.
pub struct TcpPushTransport {
    endpoint: Endpoint,
    stream: Option<TcpStream>,
    reconnect_on_error: bool,
}

impl TcpPushTransport {
    /// Connect to a `tcp://host:port` endpoint
    ///
    /// # Errors
    ///
    /// Returns error for a non-tcp scheme or if the connection fails
    pub fn connect(endpoint: &Endpoint) -> Result<Self> {
        let mut transport = Self::disconnected(endpoint)?;
        transport
            .reconnect()
            .map_err(|e| LoggerError::transport(endpoint.to_string(), e.to_string()))?;
        Ok(transport)
    }

    /// A transport for `endpoint` that dials on its first send
    ///
    /// # Errors
    ///
    /// Returns error for a non-tcp scheme
    pub fn disconnected(endpoint: &Endpoint) -> Result<Self> {
        if endpoint.scheme() != "tcp" {
            return Err(LoggerError::config(
                "TcpPushTransport",
                format!("unsupported scheme '{}'", endpoint.scheme()),
            ));
        }
        Ok(Self {
            endpoint: endpoint.clone(),
            stream: None,
            reconnect_on_error: true,
        })
    }

    /// Enable or disable dialing again after the connection is lost
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    fn reconnect(&mut self) -> io::Result<()> {
        let stream = connect_with_timeout(
            self.endpoint.host(),
            self.endpoint.port(),
            CONNECT_TIMEOUT,
        )?;

        // Set timeouts to prevent hanging
        stream.set_write_timeout(Some(IO_TIMEOUT))?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;

        // Enable TCP_NODELAY for low-latency logging
        stream.set_nodelay(true)?;

        self.stream = Some(stream);
        Ok(())
    }
}

fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message too large"))?;
    stream.write_all(&len.to_be_bytes())?;
    stream.write_all(payload)?;
    stream.flush()
}

impl PushTransport for TcpPushTransport {
    fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        if self.stream.is_none() && self.reconnect_on_error {
            self.reconnect()?;
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "connection lost"));
        };

        let result = write_frame(stream, payload);
        if result.is_err() {
            self.stream = None;
        }
        result
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

/// Pushes rendered events to a message endpoint
///
/// # Example
///
/// ```no_run
/// use rust_pattern_logger::appenders::{Endpoint, NetworkPushAppender};
/// use rust_pattern_logger::prelude::*;
///
/// let logger = Logger::new("remote", LogLevel::Info);
/// logger.add_appender(Box::new(NetworkPushAppender::new(Endpoint::tcp("127.0.0.1", 5555))));
/// logger.info("sent to the collector");
/// ```
pub struct NetworkPushAppender {
    id: AppenderId,
    endpoint: Endpoint,
    transport: Option<Box<dyn PushTransport>>,
    formatter: Option<Arc<Formatter>>,
}

impl NetworkPushAppender {
    /// Connect to `endpoint`, reporting failure to stderr.
    ///
    /// A collector that is not up yet is dialed again on the next event. An
    /// endpoint with an unsupported scheme leaves the appender inert.
    pub fn new(endpoint: Endpoint) -> Self {
        let mut transport = match TcpPushTransport::disconnected(&endpoint) {
            Ok(transport) => transport,
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] NetworkPushAppender for '{}' is disabled: {}",
                    endpoint, e
                );
                return Self::build(endpoint, None);
            }
        };

        if let Err(e) = transport.reconnect() {
            eprintln!(
                "[LOGGER ERROR] NetworkPushAppender for '{}' is not connected yet: {}",
                endpoint, e
            );
        }
        Self::build(endpoint, Some(Box::new(transport)))
    }

    /// Connect to `endpoint`
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is malformed or the connection fails
    pub fn connect(endpoint: &str) -> Result<Self> {
        let parsed: Endpoint = endpoint.parse()?;
        let transport = TcpPushTransport::connect(&parsed)?;
        Ok(Self::build(parsed, Some(Box::new(transport))))
    }

    /// Use a caller-supplied transport for `endpoint`
    pub fn with_transport(endpoint: Endpoint, transport: Box<dyn PushTransport>) -> Self {
        Self::build(endpoint, Some(transport))
    }

    fn build(endpoint: Endpoint, transport: Option<Box<dyn PushTransport>>) -> Self {
        Self {
            id: endpoint.appender_id(),
            endpoint,
            transport,
            formatter: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .is_some_and(|transport| transport.is_connected())
    }
}

impl Appender for NetworkPushAppender {
    fn id(&self) -> &AppenderId {
        &self.id
    }

    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let Some(transport) = self.transport.as_mut() else {
            return Ok(());
        };

        let message = render(self.formatter.as_ref(), &self.id, event)?;
        transport
            .send(message.as_bytes())
            .map_err(|e| LoggerError::transport(self.endpoint.to_string(), e.to_string()))
    }

    fn set_formatter(&mut self, formatter: Arc<Formatter>) {
        self.formatter = Some(formatter);
    }

    fn has_formatter(&self) -> bool {
        self.formatter.is_some()
    }
}
