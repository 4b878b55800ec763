//! Criterion benchmarks for rust_pattern_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_pattern_logger::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

fn sample_event() -> LogEvent {
    LogEvent::new(
        "bench",
        LogLevel::Info,
        "User 42 performed action \"login\" from 10.0.0.7",
        LocationInfo::new("src/server.rs", "server::session::Session::login", 118),
    )
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");
    group.throughput(Throughput::Elements(1));

    let event = sample_event();

    group.bench_function("compile_default", |b| {
        b.iter(|| black_box(Formatter::new(black_box(DEFAULT_PATTERN))));
    });

    let plain = Formatter::new("[%p] %m%n");
    group.bench_function("render_minimal", |b| {
        b.iter(|| black_box(plain.format(black_box(&event))));
    });

    let default = Formatter::new(DEFAULT_PATTERN);
    group.bench_function("render_default", |b| {
        b.iter(|| black_box(default.format(black_box(&event))));
    });

    let json = Formatter::json(DEFAULT_JSON_PATTERN);
    group.bench_function("render_json", |b| {
        b.iter(|| black_box(json.format(black_box(&event))));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_sync_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_logging");
    group.throughput(Throughput::Elements(1));

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::new("sync", LogLevel::Trace);
    logger.set_pattern(DEFAULT_PATTERN);
    logger.add_appender(Box::new(SingleFileAppender::new(
        temp_dir.path().join("sync.log"),
    )));

    group.bench_function("single_file", |b| {
        b.iter(|| {
            logger.info(black_box("Info message"));
        });
    });

    group.bench_function("macro_single_file", |b| {
        b.iter(|| {
            rust_pattern_logger::info!(logger, "request {} served in {}ms", 42, 7);
        });
    });

    group.finish();
}

fn bench_async_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logging");
    group.throughput(Throughput::Elements(1));

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = AsyncLogger::new("async", LogLevel::Trace, 10_000);
    logger.add_appender(Box::new(SingleFileAppender::new(
        temp_dir.path().join("async.log"),
    )));

    group.bench_function("enqueue", |b| {
        b.iter(|| {
            logger.info(black_box("Async info message"));
        });
    });

    group.finish();
    logger.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for num_threads in [2, 4, 8] {
        group.throughput(Throughput::Elements(num_threads as u64 * 100));
        group.bench_function(format!("{}_threads", num_threads), |b| {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let logger = Arc::new(Logger::new("concurrent", LogLevel::Trace));
            logger.add_appender(Box::new(SingleFileAppender::new(
                temp_dir.path().join("concurrent.log"),
            )));

            b.iter(|| {
                let handles: Vec<_> = (0..num_threads)
                    .map(|_| {
                        let logger = Arc::clone(&logger);
                        std::thread::spawn(move || {
                            for i in 0..100 {
                                logger.info(format!("Message {}", i));
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::new("filtered", LogLevel::Error);
    logger.add_appender(Box::new(ConsoleAppender::new()));

    group.bench_function("filtered_call", |b| {
        b.iter(|| {
            logger.debug(black_box("Filtered message"));
        });
    });

    group.bench_function("filtered_macro", |b| {
        b.iter(|| {
            rust_pattern_logger::debug!(logger, "expensive {:?}", black_box([0u8; 32]));
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_formatter,
    bench_sync_logging,
    bench_async_logging,
    bench_concurrent_logging,
    bench_level_filtering,
);

criterion_main!(benches);
