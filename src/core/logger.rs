//! Named loggers with synchronous dispatch

use super::{
    appender::{Appender, AppenderId},
    error::Result,
    formatter::{Formatter, DEFAULT_JSON_PATTERN, DEFAULT_PATTERN},
    location::LocationInfo,
    log_event::LogEvent,
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Conventional name of the default logger
pub const ROOT_LOGGER: &str = "root";

/// Logging front end shared by [`Logger`] and
/// [`AsyncLogger`](super::async_logger::AsyncLogger).
///
/// Implementors decide what happens to an event once it passed the level
/// filter; the provided methods only build events for enabled levels.
pub trait Log {
    fn name(&self) -> &str;

    fn enabled(&self, level: LogLevel) -> bool;

    /// Hand over an event that already passed the level filter
    fn submit(&self, event: LogEvent);

    /// Log with an explicit call site
    fn log_at(&self, level: LogLevel, message: impl Into<String>, location: LocationInfo) {
        if !self.enabled(level) {
            return;
        }
        self.submit(LogEvent::new(self.name(), level, message, location));
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        if !self.enabled(level) {
            return;
        }
        let location = LocationInfo::unavailable().clone();
        self.submit(LogEvent::new(self.name(), level, message, location));
    }

    #[inline]
    fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }
}

type AppenderSlot = Mutex<Box<dyn Appender>>;

/// A named, leveled logger owning a deduplicated set of appenders.
///
/// `log` renders and delivers on the caller's thread; the caller sees the
/// latency of the slowest appender.
pub struct Logger {
    name: String,
    min_level: RwLock<LogLevel>,
    appenders: RwLock<BTreeMap<AppenderId, AppenderSlot>>,
    raw_formatter: RwLock<Arc<Formatter>>,
    json_formatter: RwLock<Arc<Formatter>>,
    metrics: LoggerMetrics,
}

impl Logger {
    #[must_use]
    pub fn new(name: impl Into<String>, level: LogLevel) -> Self {
        Self {
            name: name.into(),
            min_level: RwLock::new(level),
            appenders: RwLock::new(BTreeMap::new()),
            raw_formatter: RwLock::new(Arc::new(Formatter::new(DEFAULT_PATTERN))),
            json_formatter: RwLock::new(Arc::new(Formatter::json(DEFAULT_JSON_PATTERN))),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_pattern_logger::prelude::*;
    ///
    /// let logger = Logger::builder("app")
    ///     .min_level(LogLevel::Debug)
    ///     .pattern("%p %m%n")
    ///     .appender(ConsoleAppender::new())
    ///     .build();
    /// assert_eq!(logger.appender_ids(), vec![AppenderId::Console]);
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    /// Replace the text formatter.
    ///
    /// Appenders added afterwards without a formatter of their own receive
    /// the new one; appenders already attached keep theirs.
    pub fn set_pattern(&self, pattern: &str) {
        *self.raw_formatter.write() = Arc::new(Formatter::new(pattern));
    }

    /// Replace the formatter given to JSON-oriented appenders
    pub fn set_json_pattern(&self, pattern: &str) {
        *self.json_formatter.write() = Arc::new(Formatter::json(pattern));
    }

    pub fn pattern(&self) -> String {
        self.raw_formatter.read().pattern().to_string()
    }

    pub fn json_pattern(&self) -> String {
        self.json_formatter.read().pattern().to_string()
    }

    /// Add an appender unless one with the same id is already attached.
    ///
    /// Returns `false` (and drops `appender`) for a duplicate id. An appender
    /// without a formatter gets the logger's JSON formatter if its sink kind
    /// prefers JSON, the text formatter otherwise.
    pub fn add_appender(&self, mut appender: Box<dyn Appender>) -> bool {
        let mut appenders = self.appenders.write();
        let id = appender.id().clone();
        if appenders.contains_key(&id) {
            return false;
        }

        if !appender.has_formatter() {
            let formatter = if id.prefers_json() {
                Arc::clone(&self.json_formatter.read())
            } else {
                Arc::clone(&self.raw_formatter.read())
            };
            appender.set_formatter(formatter);
        }

        appenders.insert(id, Mutex::new(appender));
        true
    }

    /// Remove and release the appender with this id
    pub fn del_appender(&self, id: &AppenderId) -> bool {
        self.appenders.write().remove(id).is_some()
    }

    /// Remove and release every appender
    pub fn clear_appenders(&self) {
        self.appenders.write().clear();
    }

    pub fn has_appender(&self, id: &AppenderId) -> bool {
        self.appenders.read().contains_key(id)
    }

    pub fn appender_ids(&self) -> Vec<AppenderId> {
        self.appenders.read().keys().cloned().collect()
    }

    pub fn appender_count(&self) -> usize {
        self.appenders.read().len()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        let appenders = self.appenders.read();
        for slot in appenders.values() {
            slot.lock().flush()?;
        }
        Ok(())
    }

    /// Deliver an event to every appender, in id order.
    ///
    /// Each appender is isolated: an error or panic in one is reported to
    /// stderr and counted, and the remaining appenders still receive the event.
    pub(crate) fn dispatch(&self, event: &LogEvent) {
        let appenders = self.appenders.read();

        for (id, slot) in appenders.iter() {
            let mut appender = slot.lock();
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.append(event)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Logger '{}': appender {} failed: {}",
                        self.name, id, e
                    );
                    self.metrics.record_failed_delivery();
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Logger '{}': appender {} panicked: {}. \
                         Other appenders continue to function.",
                        self.name,
                        id,
                        panic_message(panic_info.as_ref())
                    );
                    self.metrics.record_failed_delivery();
                }
            }
        }

        self.metrics.record_logged();
    }
}

impl Log for Logger {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    fn submit(&self, event: LogEvent) {
        self.dispatch(&event);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.level())
            .field("appenders", &self.appender_ids())
            .finish()
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing a [`Logger`] or an
/// [`AsyncLogger`](super::async_logger::AsyncLogger) with a fluent API
pub struct LoggerBuilder {
    name: String,
    min_level: LogLevel,
    pattern: Option<String>,
    json_pattern: Option<String>,
    appenders: Vec<Box<dyn Appender>>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::Trace,
            pattern: None,
            json_pattern: None,
            appenders: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn json_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.json_pattern = Some(pattern.into());
        self
    }

    /// Add an appender; duplicates by id are dropped at build time
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    pub fn build(self) -> Logger {
        let logger = Logger::new(self.name, self.min_level);
        if let Some(pattern) = &self.pattern {
            logger.set_pattern(pattern);
        }
        if let Some(pattern) = &self.json_pattern {
            logger.set_json_pattern(pattern);
        }
        for appender in self.appenders {
            logger.add_appender(appender);
        }
        logger
    }

    /// Build an asynchronous logger with the given queue capacity
    pub fn build_async(self, buffer_size: usize) -> super::async_logger::AsyncLogger {
        super::async_logger::AsyncLogger::from_logger(self.build(), buffer_size)
    }
}
