//! Registries of named loggers
//!
//! A registry hands out one shared logger per name. Registries are plain
//! values: an application usually keeps one for its lifetime and passes it
//! (or the loggers it returns) where they are needed.

use crate::config::{ConfigLoader, LoggerConfig};
use crate::core::{AsyncLogger, LogLevel, Logger, Result, ROOT_LOGGER};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

struct NamedLoggers<L> {
    loggers: Mutex<BTreeMap<String, Arc<L>>>,
}

impl<L> NamedLoggers<L> {
    fn new() -> Self {
        Self {
            loggers: Mutex::new(BTreeMap::new()),
        }
    }

    fn get_or_insert_with(&self, name: &str, make: impl FnOnce() -> L) -> Arc<L> {
        let mut loggers = self.loggers.lock();
        if let Some(existing) = loggers.get(name) {
            return Arc::clone(existing);
        }
        let logger = Arc::new(make());
        loggers.insert(name.to_string(), Arc::clone(&logger));
        logger
    }

    fn get(&self, name: &str) -> Option<Arc<L>> {
        self.loggers.lock().get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.loggers.lock().keys().cloned().collect()
    }

    fn all(&self) -> Vec<Arc<L>> {
        self.loggers.lock().values().cloned().collect()
    }
}

/// Name to [`Logger`] map
///
/// # Example
/// ```
/// use rust_pattern_logger::prelude::*;
///
/// let registry = LoggerRegistry::new();
/// let first = registry.initialize("db", LogLevel::Info);
/// let second = registry.initialize("db", LogLevel::Trace);
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(second.level(), LogLevel::Info);
/// ```
pub struct LoggerRegistry {
    loggers: NamedLoggers<Logger>,
}

impl LoggerRegistry {
    pub fn new() -> Self {
        Self {
            loggers: NamedLoggers::new(),
        }
    }

    /// Return the logger registered under `name`, creating it with `level`
    /// if absent. The level of an existing logger is left as is.
    pub fn initialize(&self, name: &str, level: LogLevel) -> Arc<Logger> {
        self.loggers
            .get_or_insert_with(name, || Logger::new(name, level))
    }

    /// The logger named [`ROOT_LOGGER`], created at `Trace` if absent
    pub fn root(&self) -> Arc<Logger> {
        self.initialize(ROOT_LOGGER, LogLevel::Trace)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(name)
    }

    /// Registered names in sorted order
    pub fn logger_names(&self) -> Vec<String> {
        self.loggers.names()
    }

    /// Create or update loggers from configuration.
    ///
    /// Patterns are applied before appenders are attached, so the configured
    /// formatters reach the new appenders. Appenders the logger already has
    /// are not constructed again.
    pub fn configure(&self, configs: &[LoggerConfig]) {
        for config in configs {
            let logger = self.initialize(&config.name, config.level);
            if !config.raw_pattern.is_empty() {
                logger.set_pattern(&config.raw_pattern);
            }
            if !config.json_pattern.is_empty() {
                logger.set_json_pattern(&config.json_pattern);
            }
            for appender in config.build_missing_appenders(|id| logger.has_appender(id)) {
                logger.add_appender(appender);
            }
        }
    }

    /// Load a configuration file and apply it
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or malformed; no logger is
    /// touched in that case
    pub fn init_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let configs = ConfigLoader::load(path)?;
        self.configure(&configs);
        Ok(())
    }

    /// Flush every registered logger, reporting failures to stderr
    pub fn flush_all(&self) {
        for logger in self.loggers.all() {
            if let Err(e) = logger.flush() {
                eprintln!(
                    "[LOGGER ERROR] Logger '{}': flush failed: {}",
                    logger.name(),
                    e
                );
            }
        }
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Name to [`AsyncLogger`] map
pub struct AsyncLoggerRegistry {
    loggers: NamedLoggers<AsyncLogger>,
}

impl AsyncLoggerRegistry {
    pub fn new() -> Self {
        Self {
            loggers: NamedLoggers::new(),
        }
    }

    /// Return the logger registered under `name`, creating it if absent.
    /// Level and buffer size only apply on creation.
    pub fn initialize(&self, name: &str, level: LogLevel, buffer_size: usize) -> Arc<AsyncLogger> {
        self.loggers
            .get_or_insert_with(name, || AsyncLogger::new(name, level, buffer_size))
    }

    pub fn root(&self) -> Arc<AsyncLogger> {
        self.initialize(ROOT_LOGGER, LogLevel::Trace, 0)
    }

    pub fn get(&self, name: &str) -> Option<Arc<AsyncLogger>> {
        self.loggers.get(name)
    }

    pub fn logger_names(&self) -> Vec<String> {
        self.loggers.names()
    }

    /// Create or update loggers from configuration, honouring `bufferSize`
    pub fn configure(&self, configs: &[LoggerConfig]) {
        for config in configs {
            let logger = self.initialize(&config.name, config.level, config.buffer_size);
            if !config.raw_pattern.is_empty() {
                logger.set_pattern(&config.raw_pattern);
            }
            if !config.json_pattern.is_empty() {
                logger.set_json_pattern(&config.json_pattern);
            }
            for appender in config.build_missing_appenders(|id| logger.has_appender(id)) {
                logger.add_appender(appender);
            }
        }
    }

    /// # Errors
    ///
    /// Returns error if the file is missing or malformed
    pub fn init_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let configs = ConfigLoader::load(path)?;
        self.configure(&configs);
        Ok(())
    }

    /// Shut down every logger, draining their queues.
    ///
    /// Each logger gets the full `timeout`. Returns `false` if any of them
    /// did not finish in time.
    pub fn shutdown_all(&self, timeout: Duration) -> bool {
        self.loggers
            .all()
            .iter()
            .map(|logger| logger.shutdown(timeout))
            .fold(true, |all_done, done| all_done && done)
    }
}

impl Default for AsyncLoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
