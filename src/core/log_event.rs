//! Log event structure

use super::location::LocationInfo;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::cell::RefCell;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Numeric part of the current `ThreadId`, computed once per thread
fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let raw = format!("{:?}", std::thread::current().id());
                raw.chars().filter(char::is_ascii_digit).collect()
            })
            .clone()
    })
}

fn current_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// One log call, captured on the producing thread.
///
/// Events are immutable once built; dispatch only ever hands out shared
/// references (sync path) or moves the value through the queue (async path).
#[derive(Debug, Clone)]
pub struct LogEvent {
    logger_name: String,
    level: LogLevel,
    content: String,
    location: LocationInfo,
    timestamp: DateTime<Utc>,
    thread_id: String,
    thread_name: Option<String>,
}

impl LogEvent {
    pub fn new(
        logger_name: impl Into<String>,
        level: LogLevel,
        content: impl Into<String>,
        location: LocationInfo,
    ) -> Self {
        Self {
            logger_name: logger_name.into(),
            level,
            content: content.into(),
            location,
            timestamp: Utc::now(),
            thread_id: current_thread_id(),
            thread_name: current_thread_name(),
        }
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn location(&self) -> &LocationInfo {
        &self.location
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }
}
