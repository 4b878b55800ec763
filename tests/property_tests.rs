//! Property-based tests for rust_pattern_logger using proptest

use proptest::prelude::*;
use rust_pattern_logger::prelude::*;

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Fatal),
    ]
}

fn event(level: LogLevel, message: &str) -> LogEvent {
    LogEvent::new(
        "prop",
        level,
        message,
        LocationInfo::new("src/prop.rs", "crate::module::Type::method", 7),
    )
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Test that the numeric form agrees with the ordering
    #[test]
    fn test_log_level_numeric_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a < b, a.as_u8() < b.as_u8());
        prop_assert_eq!(LogLevel::from_u8(a.as_u8()), Some(a));
    }

    #[test]
    fn test_log_level_out_of_range(value in 6u8..=u8::MAX) {
        prop_assert_eq!(LogLevel::from_u8(value), None);
    }
}

// ============================================================================
// Formatter Tests
// ============================================================================

proptest! {
    /// Text without `%` renders verbatim
    #[test]
    fn test_literal_patterns_render_verbatim(pattern in "[^%]*") {
        let formatter = Formatter::new(pattern.as_str());
        prop_assert_eq!(formatter.format(&event(LogLevel::Info, "m")), pattern);
    }

    /// `%%` always renders a single percent sign
    #[test]
    fn test_escaped_percent(prefix in "[a-z ]*", suffix in "[a-z ]*") {
        let formatter = Formatter::new(format!("{}%%{}", prefix, suffix));
        let rendered = formatter.format(&event(LogLevel::Info, "m"));
        prop_assert_eq!(rendered, format!("{}%{}", prefix, suffix));
    }

    /// The message is inserted unmodified by the text formatter
    #[test]
    fn test_message_inserted_verbatim(message in ".*", level in any_level()) {
        let formatter = Formatter::new("[%p] %m");
        let rendered = formatter.format(&event(level, &message));
        prop_assert_eq!(rendered, format!("[{}] {}", level, message));
    }

    /// Compiling and rendering any pattern never panics
    #[test]
    fn test_arbitrary_pattern_no_panic(pattern in ".*", message in ".*") {
        let formatter = Formatter::new(pattern.as_str());
        let _ = formatter.format(&event(LogLevel::Warn, &message));
        let json = Formatter::json(pattern.as_str());
        let _ = json.format(&event(LogLevel::Warn, &message));
    }

    /// Compiling one pattern twice renders the same event identically
    #[test]
    fn test_recompiled_pattern_renders_identically(
        pattern in ".*",
        message in ".*",
        level in any_level(),
    ) {
        let event = event(level, &message);
        prop_assert_eq!(
            Formatter::new(pattern.as_str()).format(&event),
            Formatter::new(pattern.as_str()).format(&event)
        );
        prop_assert_eq!(
            Formatter::json(pattern.as_str()).format(&event),
            Formatter::json(pattern.as_str()).format(&event)
        );
    }

    /// The same holds for timestamp directives, valid or not
    #[test]
    fn test_recompiled_time_pattern_renders_identically(
        time_format in prop_oneof![
            Just("%Y-%m-%d %H:%M:%S".to_string()),
            Just("%H:%M:%S%.3f".to_string()),
            Just("%s".to_string()),
            Just("".to_string()),
            Just("%Q".to_string()),
            "[a-zA-Z%:. -]{0,12}",
        ],
        prefix in "[a-z ]*",
    ) {
        let pattern = format!("{}%d{{{}}} %d [%p] %m", prefix, time_format);
        let event = event(LogLevel::Info, "tick");
        prop_assert_eq!(
            Formatter::new(pattern.as_str()).format(&event),
            Formatter::new(pattern.as_str()).format(&event)
        );
    }

    /// Unknown directives render as an error literal naming the directive
    #[test]
    fn test_unknown_directive(letter in "[ABDEGHIJKLOPRSUVWXYZabceghijkoqrsuvwxyz]") {
        let formatter = Formatter::new(format!("%{}", letter));
        let rendered = formatter.format(&event(LogLevel::Info, "m"));
        prop_assert_eq!(rendered, format!("<Fmt Error> : %{}", letter));
    }

    /// The JSON formatter keeps the default document parseable for any message
    #[test]
    fn test_json_output_is_valid(message in ".*", level in any_level()) {
        let formatter = Formatter::json(DEFAULT_JSON_PATTERN);
        let rendered = formatter.format(&event(level, &message));
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        prop_assert_eq!(value["body"]["msg"].as_str(), Some(message.as_str()));
        prop_assert_eq!(value["body"]["level"].as_str(), Some(level.to_str()));
    }
}

// ============================================================================
// Location Tests
// ============================================================================

proptest! {
    /// Class and method split at the last `::` and drop the argument list
    #[test]
    fn test_signature_split(
        path in "[a-z]{1,8}(::[a-z]{1,8}){0,3}",
        method in "[a-z_]{1,12}",
        args in "[a-z, ]*",
    ) {
        let signature = format!("{}::{}({})", path, method, args);
        let location = LocationInfo::new("f.rs", signature, 1);
        prop_assert_eq!(location.class_name(), path.as_str());
        prop_assert_eq!(location.method_name(), method.as_str());
    }
}

// ============================================================================
// Logger Tests
// ============================================================================

proptest! {
    /// Registry hands out one logger per name, whatever the later levels
    #[test]
    fn test_registry_idempotent(name in "[a-z]{1,10}", first in any_level(), second in any_level()) {
        let registry = LoggerRegistry::new();
        let a = registry.initialize(&name, first);
        let b = registry.initialize(&name, second);
        prop_assert!(std::sync::Arc::ptr_eq(&a, &b));
        prop_assert_eq!(b.level(), first);
    }

    /// Adding the same appender id repeatedly keeps exactly one
    #[test]
    fn test_console_dedup(count in 1usize..10) {
        let logger = Logger::new("dedup", LogLevel::Trace);
        let added = (0..count)
            .filter(|_| logger.add_appender(Box::new(ConsoleAppender::new())))
            .count();
        prop_assert_eq!(added, 1);
        prop_assert_eq!(logger.appender_count(), 1);
    }
}
