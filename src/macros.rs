//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They capture the
//! call site (file, line and enclosing function), and skip formatting
//! entirely when the level is filtered out.
//!
//! # Examples
//!
//! ```
//! use rust_pattern_logger::prelude::*;
//! use rust_pattern_logger::info;
//!
//! let logger = Logger::new("server", LogLevel::Info);
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Capture the current call site as a
/// [`LocationInfo`](crate::core::location::LocationInfo).
///
/// # Examples
///
/// ```
/// fn handler() -> rust_pattern_logger::LocationInfo {
///     rust_pattern_logger::location!()
/// }
///
/// let loc = handler();
/// assert_eq!(loc.method_name(), "handler");
/// ```
#[macro_export]
macro_rules! location {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::core::location::LocationInfo::new(
            file!(),
            $crate::core::location::function_path(__type_name_of(__here)),
            line!(),
        )
    }};
}

/// Log a message with automatic formatting.
///
/// Works with anything implementing [`Log`](crate::core::Log), including
/// `Arc`-wrapped loggers handed out by a registry.
///
/// # Examples
///
/// ```
/// # use rust_pattern_logger::prelude::*;
/// # let logger = Logger::new("app", LogLevel::Trace);
/// use rust_pattern_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::core::Log as _;
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.log_at(level, format!($($arg)+), $crate::location!());
        }
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_pattern_logger::prelude::*;
/// # let logger = Logger::new("app", LogLevel::Trace);
/// use rust_pattern_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_pattern_logger::prelude::*;
/// # let logger = Logger::new("app", LogLevel::Trace);
/// use rust_pattern_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_pattern_logger::prelude::*;
/// # let logger = AsyncLogger::new("app", LogLevel::Trace, 16);
/// use rust_pattern_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 404, "Not found");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
