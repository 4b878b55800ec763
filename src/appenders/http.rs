//! HTTP appender
//!
//! Posts each rendered event as a JSON body to `http://host:port/` and waits
//! for the response status. By default a logger attaches its JSON formatter
//! to this appender.

use super::{connect_with_timeout, render};
use crate::core::{Appender, AppenderId, Formatter, LogEvent, LoggerError, Result};
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;
use std::time::Duration;

const CONTENT_TYPE: &str = "application/json;charset=UTF-8";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Synchronous JSON POST used by [`HttpAppender`]
pub trait HttpTransport: Send {
    /// Post `body` and return the response status code
    fn post_json(&mut self, body: &str) -> Result<u16>;
}

/// Minimal HTTP/1.1 client: one connection per request
#[derive(Debug, Clone)]
pub struct HttpClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns error if the host is empty or the port is zero
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        if host.is_empty() || port == 0 {
            return Err(LoggerError::config(
                "HttpClient",
                format!("invalid address '{}:{}'", host, port),
            ));
        }
        Ok(Self {
            host,
            port,
            timeout: REQUEST_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    fn request(&self, body: &str) -> std::io::Result<u16> {
        let mut stream = connect_with_timeout(&self.host, self.port, self.timeout)?;
        stream.set_write_timeout(Some(self.timeout))?;
        stream.set_read_timeout(Some(self.timeout))?;

        let request = format!(
            "POST / HTTP/1.1\r\n\
             Host: {}:{}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            self.host,
            self.port,
            CONTENT_TYPE,
            body.len(),
            body
        );
        stream.write_all(request.as_bytes())?;
        stream.flush()?;

        let mut status_line = String::new();
        BufReader::new(stream).read_line(&mut status_line)?;
        parse_status(&status_line).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed status line '{}'", status_line.trim_end()),
            )
        })
    }
}

impl HttpTransport for HttpClient {
    fn post_json(&mut self, body: &str) -> Result<u16> {
        self.request(body)
            .map_err(|e| LoggerError::transport(self.url(), e.to_string()))
    }
}

/// Status code from a line such as `HTTP/1.1 200 OK`
fn parse_status(line: &str) -> Option<u16> {
    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}

/// Delivers events to an HTTP collector
pub struct HttpAppender {
    id: AppenderId,
    url: String,
    transport: Option<Box<dyn HttpTransport>>,
    formatter: Option<Arc<Formatter>>,
}

impl HttpAppender {
    /// Set up the client, reporting failure to stderr.
    ///
    /// An appender whose client could not be set up stays inert.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        match Self::try_new(host.clone(), port) {
            Ok(appender) => appender,
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] HttpAppender for '{}:{}' is disabled: {}",
                    host, port, e
                );
                Self::build(host, port, None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns error if the client cannot be set up for this address
    pub fn try_new(host: impl Into<String>, port: u16) -> Result<Self> {
        let host = host.into();
        let client = HttpClient::new(host.clone(), port)?;
        Ok(Self::build(host, port, Some(Box::new(client))))
    }

    /// Use a caller-supplied transport
    pub fn with_transport(
        host: impl Into<String>,
        port: u16,
        transport: Box<dyn HttpTransport>,
    ) -> Self {
        Self::build(host.into(), port, Some(transport))
    }

    fn build(host: String, port: u16, transport: Option<Box<dyn HttpTransport>>) -> Self {
        Self {
            url: format!("http://{}:{}/", host, port),
            id: AppenderId::http(&host, port),
            transport,
            formatter: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Appender for HttpAppender {
    fn id(&self) -> &AppenderId {
        &self.id
    }

    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let Some(transport) = self.transport.as_mut() else {
            return Ok(());
        };

        let body = render(self.formatter.as_ref(), &self.id, event)?;
        let status = transport.post_json(&body)?;
        if !(200..300).contains(&status) {
            return Err(LoggerError::transport(
                self.url.as_str(),
                format!("server responded with status {}", status),
            ));
        }
        Ok(())
    }

    fn set_formatter(&mut self, formatter: Arc<Formatter>) {
        self.formatter = Some(formatter);
    }

    fn has_formatter(&self) -> bool {
        self.formatter.is_some()
    }
}
