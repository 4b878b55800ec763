//! # Rust Pattern Logger
//!
//! Named, leveled loggers that render events through printf-style patterns
//! and deliver them to a set of appenders.
//!
//! ## Features
//!
//! - **Pattern formatting**: `%d{...}`, `%p`, `%m`, `%f`, `%l`, `%C`, `%M` and
//!   more, compiled once per pattern, with a JSON-escaping variant
//! - **Appenders**: console, single file, size-rolled files, network push and HTTP
//! - **Sync and async loggers**: direct dispatch, or a bounded queue drained
//!   by a worker thread that never blocks producers
//! - **Registries and configuration**: one logger per name, configurable from JSON or XML
//!
//! ```
//! use rust_pattern_logger::prelude::*;
//! use rust_pattern_logger::info;
//!
//! let registry = LoggerRegistry::new();
//! let logger = registry.initialize("app", LogLevel::Info);
//! logger.set_pattern("[%p] %m%n");
//! logger.add_appender(Box::new(ConsoleAppender::new()));
//!
//! info!(logger, "listening on {}", 8080);
//! ```

pub mod appenders;
pub mod config;
pub mod core;
pub mod macros;
pub mod registry;

pub mod prelude {
    pub use crate::appenders::{
        ConsoleAppender, HttpAppender, NetworkPushAppender, RollFileAppender, SingleFileAppender,
    };
    pub use crate::config::{ConfigLoader, LoggerConfig};
    pub use crate::core::{
        Appender, AppenderId, AsyncLogger, Formatter, Log, LogEvent, LogLevel, Logger,
        LoggerBuilder, LoggerError, LoggerMetrics, LocationInfo, Result, SinkKind,
        DEFAULT_JSON_PATTERN, DEFAULT_PATTERN, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::registry::{AsyncLoggerRegistry, LoggerRegistry};
}

pub use appenders::{
    ConsoleAppender, HttpAppender, NetworkPushAppender, RollFileAppender, SingleFileAppender,
};
pub use config::{ConfigLoader, LoggerConfig};
pub use core::{
    Appender, AppenderId, AsyncLogger, Escape, Formatter, LocationInfo, Log, LogEvent, LogLevel,
    Logger, LoggerBuilder, LoggerError, LoggerMetrics, Result, SinkKind, DEFAULT_BUFFER_SIZE,
    DEFAULT_JSON_PATTERN, DEFAULT_PATTERN, DEFAULT_SHUTDOWN_TIMEOUT, ROOT_LOGGER,
};
pub use registry::{AsyncLoggerRegistry, LoggerRegistry};
