//! Core logger types and traits

pub mod appender;
pub mod async_logger;
pub mod error;
pub mod formatter;
pub mod location;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod metrics;

pub use appender::{Appender, AppenderId, SinkKind};
pub use async_logger::{AsyncLogger, DEFAULT_BUFFER_SIZE, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::{LoggerError, Result};
pub use formatter::{Escape, Formatter, DEFAULT_JSON_PATTERN, DEFAULT_PATTERN, DEFAULT_TIME_FORMAT};
pub use location::LocationInfo;
pub use log_event::LogEvent;
pub use log_level::LogLevel;
pub use logger::{Log, Logger, LoggerBuilder, ROOT_LOGGER};
pub use metrics::LoggerMetrics;
