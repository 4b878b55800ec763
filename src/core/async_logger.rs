//! Logger that hands events to a bounded queue drained by a worker thread

use super::{
    appender::{Appender, AppenderId},
    error::Result,
    log_event::LogEvent,
    log_level::LogLevel,
    logger::{panic_message, Log, Logger},
    metrics::LoggerMetrics,
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Queue capacity used when a caller asks for zero slots
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Default timeout for graceful shutdown
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound of events the worker takes per wake-up
const BATCH_SIZE: usize = 64;

/// A logger whose `log` only enqueues.
///
/// Producers never block: when the queue is full the event is discarded and
/// counted in [`LoggerMetrics::dropped_count`]. A single consumer thread
/// dispatches queued events to the appenders in FIFO order.
///
/// # Example
/// ```
/// use rust_pattern_logger::prelude::*;
///
/// let logger = AsyncLogger::new("worker", LogLevel::Info, 1024);
/// logger.info("queued");
/// assert!(logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));
/// ```
pub struct AsyncLogger {
    core: Arc<Logger>,
    capacity: usize,
    sender: RwLock<Option<Sender<LogEvent>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncLogger {
    /// Create the logger and start its consumer thread.
    ///
    /// A `buffer_size` of zero selects [`DEFAULT_BUFFER_SIZE`].
    pub fn new(name: impl Into<String>, level: LogLevel, buffer_size: usize) -> Self {
        Self::from_logger(Logger::new(name, level), buffer_size)
    }

    pub(crate) fn from_logger(logger: Logger, buffer_size: usize) -> Self {
        let capacity = if buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            buffer_size
        };
        let core = Arc::new(logger);
        let (sender, receiver) = bounded(capacity);

        let worker_core = Arc::clone(&core);
        let spawned = thread::Builder::new()
            .name(format!("async-logger-{}", core.name()))
            .spawn(move || run_consumer(&worker_core, receiver));

        let (sender, worker) = match spawned {
            Ok(handle) => (Some(sender), Some(handle)),
            Err(e) => {
                eprintln!(
                    "[LOGGER CRITICAL] Logger '{}': failed to start async worker: {}. \
                     Events will be dropped.",
                    core.name(),
                    e
                );
                (None, None)
            }
        };

        Self {
            core,
            capacity,
            sender: RwLock::new(sender),
            worker: Mutex::new(worker),
        }
    }

    pub fn name(&self) -> &str {
        self.core.name()
    }

    pub fn level(&self) -> LogLevel {
        self.core.level()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.core.set_level(level);
    }

    pub fn set_pattern(&self, pattern: &str) {
        self.core.set_pattern(pattern);
    }

    pub fn set_json_pattern(&self, pattern: &str) {
        self.core.set_json_pattern(pattern);
    }

    pub fn pattern(&self) -> String {
        self.core.pattern()
    }

    pub fn json_pattern(&self) -> String {
        self.core.json_pattern()
    }

    pub fn add_appender(&self, appender: Box<dyn Appender>) -> bool {
        self.core.add_appender(appender)
    }

    pub fn del_appender(&self, id: &AppenderId) -> bool {
        self.core.del_appender(id)
    }

    pub fn clear_appenders(&self) {
        self.core.clear_appenders();
    }

    pub fn has_appender(&self, id: &AppenderId) -> bool {
        self.core.has_appender(id)
    }

    pub fn appender_ids(&self) -> Vec<AppenderId> {
        self.core.appender_ids()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.core.metrics()
    }

    pub fn dropped_count(&self) -> u64 {
        self.core.metrics().dropped_count()
    }

    /// Queue capacity in events
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events waiting in the queue
    pub fn pending(&self) -> usize {
        self.sender.read().as_ref().map_or(0, Sender::len)
    }

    pub fn is_running(&self) -> bool {
        self.sender.read().is_some()
    }

    /// Flush the appenders. Events still queued are not waited for.
    pub fn flush(&self) -> Result<()> {
        self.core.flush()
    }

    /// Close the queue and wait for the worker to drain it.
    ///
    /// Events enqueued before this call are delivered unless `timeout` elapses
    /// first, in which case `false` is returned and the worker is left to
    /// finish on its own. Later calls return `true` immediately.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        // Closing the channel lets the worker exit once it has drained
        drop(self.sender.write().take());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!(
                        "[LOGGER ERROR] Logger '{}': async worker panicked during shutdown: {}",
                        self.name(),
                        panic_message(e.as_ref())
                    );
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Logger '{}': async worker did not finish within {:?}. \
                     Some logs may be lost.",
                    self.name(),
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    fn record_overflow(&self) {
        let metrics = self.core.metrics();
        metrics.record_queue_full();
        let dropped_count = metrics.record_dropped();

        // Alert on first drop and periodically thereafter
        if dropped_count == 0 || (dropped_count + 1) % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}': queue full ({} slots), {} logs dropped. \
                 Consider increasing the buffer size.",
                self.name(),
                self.capacity,
                dropped_count + 1
            );
        }
    }
}

impl Log for AsyncLogger {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn enabled(&self, level: LogLevel) -> bool {
        Log::enabled(self.core.as_ref(), level)
    }

    fn submit(&self, event: LogEvent) {
        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            // stopped
            self.core.metrics().record_dropped();
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.record_overflow(),
            Err(TrySendError::Disconnected(_)) => {
                self.core.metrics().record_dropped();
            }
        }
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let metrics = self.core.metrics();
        let dropped = metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger '{}' shutting down with {} dropped logs (drop rate: {:.2}%)",
                self.name(),
                dropped,
                metrics.drop_rate()
            );
        }
    }
}

impl std::fmt::Debug for AsyncLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncLogger")
            .field("core", &self.core)
            .field("capacity", &self.capacity)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Drain the queue until every sender is gone, then flush
fn run_consumer(core: &Logger, receiver: Receiver<LogEvent>) {
    let mut batch = Vec::with_capacity(BATCH_SIZE);

    while let Ok(event) = receiver.recv() {
        batch.push(event);
        while batch.len() < BATCH_SIZE {
            match receiver.try_recv() {
                Ok(event) => batch.push(event),
                Err(_) => break,
            }
        }

        for event in batch.drain(..) {
            core.dispatch(&event);
        }
    }

    if let Err(e) = core.flush() {
        eprintln!(
            "[LOGGER ERROR] Logger '{}': failed to flush after draining: {}",
            core.name(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::formatter::Formatter;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Collects rendered lines; with a gate, `append` signals entry and
    /// blocks until the gate opens
    struct CollectingAppender {
        id: AppenderId,
        formatter: Option<Arc<Formatter>>,
        lines: Arc<Mutex<Vec<String>>>,
        gate: Option<(Arc<AtomicBool>, Arc<AtomicBool>)>,
    }

    impl CollectingAppender {
        fn new(
            gate: Option<(Arc<AtomicBool>, Arc<AtomicBool>)>,
        ) -> (Self, Arc<Mutex<Vec<String>>>) {
            let lines = Arc::new(Mutex::new(Vec::new()));
            let appender = Self {
                id: AppenderId::Custom("collect".into()),
                formatter: None,
                lines: Arc::clone(&lines),
                gate,
            };
            (appender, lines)
        }
    }

    impl Appender for CollectingAppender {
        fn id(&self) -> &AppenderId {
            &self.id
        }

        fn append(&mut self, event: &LogEvent) -> Result<()> {
            if let Some((entered, open)) = &self.gate {
                entered.store(true, Ordering::Release);
                while !open.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_millis(1));
                }
            }
            if let Some(formatter) = &self.formatter {
                self.lines.lock().push(formatter.format(event));
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

    #[test]
    fn test_events_delivered_in_order() {
        let logger = AsyncLogger::new("ordered", LogLevel::Trace, 128);
        logger.set_pattern("%m");
        let (appender, lines) = CollectingAppender::new(None);
        logger.add_appender(Box::new(appender));

        for i in 0..100 {
            logger.info(format!("{}", i));
        }
        assert!(logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));

        let expected: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(*lines.lock(), expected);
        assert_eq!(logger.dropped_count(), 0);
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let entered = Arc::new(AtomicBool::new(false));
        let open = Arc::new(AtomicBool::new(false));
        let logger = AsyncLogger::new("overflow", LogLevel::Trace, 2);
        logger.set_pattern("%m");
        let (appender, lines) =
            CollectingAppender::new(Some((Arc::clone(&entered), Arc::clone(&open))));
        logger.add_appender(Box::new(appender));

        // park the worker inside the appender
        logger.info("first");
        while !entered.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
        }

        let start = Instant::now();
        for i in 0..50 {
            logger.info(format!("{}", i));
        }
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(logger.pending(), 2);
        assert_eq!(logger.dropped_count(), 48);
        assert_eq!(logger.metrics().queue_full_events(), 48);

        open.store(true, Ordering::Release);
        assert!(logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));

        assert_eq!(*lines.lock(), vec!["first", "0", "1"]);
    }

    #[test]
    fn test_zero_capacity_uses_default() {
        let logger = AsyncLogger::new("defaulted", LogLevel::Trace, 0);
        assert_eq!(logger.capacity(), DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn test_filtered_events_are_not_enqueued() {
        let logger = AsyncLogger::new("filtered", LogLevel::Error, 4);
        logger.set_pattern("%m");
        let (appender, lines) = CollectingAppender::new(None);
        logger.add_appender(Box::new(appender));

        for _ in 0..100 {
            logger.debug("ignored");
        }
        assert!(logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));

        assert!(lines.lock().is_empty());
        assert_eq!(logger.dropped_count(), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let logger = AsyncLogger::new("twice", LogLevel::Trace, 8);
        assert!(logger.is_running());
        assert!(logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT));
        assert!(!logger.is_running());
        assert!(logger.shutdown(Duration::from_millis(1)));

        logger.info("after shutdown");
        assert_eq!(logger.dropped_count(), 1);
        assert_eq!(logger.metrics().queue_full_events(), 0);
    }
}
