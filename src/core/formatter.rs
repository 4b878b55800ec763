//! Pattern formatter
//!
//! A [`Formatter`] compiles a pattern string once into an ordered list of
//! render items and renders a [`LogEvent`] by concatenating the output of
//! each item.
//!
//! | Directive | Output                                   |
//! |-----------|------------------------------------------|
//! | `%%`      | a literal `%`                            |
//! | `%n`      | newline                                  |
//! | `%T`      | tab                                      |
//! | `%m`      | message                                  |
//! | `%p`      | level name                               |
//! | `%t`      | thread id                                |
//! | `%f`      | file name                                |
//! | `%l`      | line number                              |
//! | `%C`      | class name                               |
//! | `%M`      | method name                              |
//! | `%F`      | task (thread) name                       |
//! | `%N`      | logger name                              |
//! | `%d{FMT}` | local timestamp, strftime-style `FMT`    |
//!
//! Compilation never fails: an unknown directive `%X` compiles to the
//! literal text `<Fmt Error> : %X`.
//!
//! # Example
//!
//! ```
//! use rust_pattern_logger::core::{Formatter, LocationInfo, LogEvent, LogLevel};
//!
//! let formatter = Formatter::new("[%p] %m%n");
//! let event = LogEvent::new("root", LogLevel::Error, "boom", LocationInfo::default());
//! assert_eq!(formatter.format(&event), "[ERROR] boom\n");
//! ```

use super::location::NA;
use super::log_event::LogEvent;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use std::fmt::Write;

/// Default text pattern for loggers
pub const DEFAULT_PATTERN: &str = "[%d{%Y-%m-%d %H:%M:%S}] [%p] [%f:%l] [%N] [%C] [%M] [%t] %m%n";

/// Default pattern for JSON-oriented sinks
pub const DEFAULT_JSON_PATTERN: &str = concat!(
    r#"{"headers":"%N","body":{"time":"%d{%Y-%m-%d %H:%M:%S}","level":"%p","#,
    r#""file_name":"%f","line":"%l","class":"%C","method":"%M","thread_id":"%t","msg":"%m"}}"#
);

/// Timestamp format used by a bare `%d`
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FMT_ERROR: &str = "<Fmt Error> : %";

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormatItem {
    Literal(String),
    Message,
    Level,
    ThreadId,
    DateTime(String),
    FileName,
    LineNumber,
    Tab,
    NewLine,
    ClassName,
    MethodName,
    TaskId,
    LoggerName,
}

/// Single-letter directives with a fixed renderer
fn lookup_directive(letter: char) -> Option<FormatItem> {
    let item = match letter {
        'm' => FormatItem::Message,
        'p' => FormatItem::Level,
        'n' => FormatItem::NewLine,
        't' => FormatItem::ThreadId,
        'f' => FormatItem::FileName,
        'l' => FormatItem::LineNumber,
        'T' => FormatItem::Tab,
        'C' => FormatItem::ClassName,
        'M' => FormatItem::MethodName,
        'F' => FormatItem::TaskId,
        'N' => FormatItem::LoggerName,
        _ => return None,
    };
    Some(item)
}

/// How rendered field values are written into the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escape {
    /// Values are written verbatim
    #[default]
    None,
    /// Values are escaped for use inside a JSON string literal
    Json,
}

#[derive(Debug, Clone)]
pub struct Formatter {
    pattern: String,
    items: Vec<FormatItem>,
    escape: Escape,
}

impl Formatter {
    /// Compile a plain text pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        Self::with_escape(pattern, Escape::None)
    }

    /// Compile a pattern whose field values are JSON-escaped.
    ///
    /// Literal text of the pattern is emitted as written, so the pattern
    /// itself supplies the JSON structure and quotes.
    pub fn json(pattern: impl Into<String>) -> Self {
        Self::with_escape(pattern, Escape::Json)
    }

    pub fn with_escape(pattern: impl Into<String>, escape: Escape) -> Self {
        let pattern = pattern.into();
        let items = compile(&pattern);
        Self {
            pattern,
            items,
            escape,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn escape(&self) -> Escape {
        self.escape
    }

    /// Render an event
    pub fn format(&self, event: &LogEvent) -> String {
        let mut out = String::with_capacity(self.pattern.len() + event.content().len() + 64);
        for item in &self.items {
            self.render_item(item, event, &mut out);
        }
        out
    }

    fn render_item(&self, item: &FormatItem, event: &LogEvent, out: &mut String) {
        let location = event.location();
        match item {
            FormatItem::Literal(text) => out.push_str(text),
            FormatItem::Tab => out.push('\t'),
            FormatItem::NewLine => out.push('\n'),
            FormatItem::Message => self.push_field(out, event.content()),
            FormatItem::Level => out.push_str(event.level().to_str()),
            FormatItem::ThreadId => out.push_str(event.thread_id()),
            FormatItem::TaskId => self.push_field(out, event.thread_name().unwrap_or(NA)),
            FormatItem::FileName => self.push_field(out, location.file_name()),
            FormatItem::LineNumber => {
                let _ = write!(out, "{}", location.line_number());
            }
            FormatItem::ClassName => self.push_field(out, location.class_name()),
            FormatItem::MethodName => self.push_field(out, location.method_name()),
            FormatItem::LoggerName => self.push_field(out, event.logger_name()),
            FormatItem::DateTime(fmt) => {
                let local = event.timestamp().with_timezone(&Local);
                let mut rendered = String::new();
                // the format was validated at compile time, so this cannot fail
                let _ = write!(rendered, "{}", local.format(fmt));
                self.push_field(out, &rendered);
            }
        }
    }

    fn push_field(&self, out: &mut String, value: &str) {
        match self.escape {
            Escape::None => out.push_str(value),
            Escape::Json => push_json_escaped(out, value),
        }
    }
}

fn push_json_escaped(out: &mut String, value: &str) {
    match serde_json::to_string(value) {
        Ok(quoted) => out.push_str(&quoted[1..quoted.len() - 1]),
        Err(_) => out.push_str(value),
    }
}

fn compile(pattern: &str) -> Vec<FormatItem> {
    let mut items = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    while pos < pattern.len() {
        let rest = &pattern[pos..];
        let Some(percent) = rest.find('%') else {
            literal.push_str(rest);
            break;
        };
        literal.push_str(&rest[..percent]);
        pos += percent + 1;

        let Some(directive) = pattern[pos..].chars().next() else {
            literal.push_str(FMT_ERROR);
            break;
        };
        pos += directive.len_utf8();

        match directive {
            '%' => literal.push('%'),
            'd' => {
                let (fmt, consumed) = split_time_format(&pattern[pos..]);
                pos += consumed;
                match fmt {
                    Some(fmt) if !is_valid_time_format(fmt) => {
                        let _ = write!(literal, "{}d{{{}}}", FMT_ERROR, fmt);
                    }
                    fmt => {
                        push_literal(&mut items, &mut literal);
                        let fmt = fmt.unwrap_or(DEFAULT_TIME_FORMAT);
                        items.push(FormatItem::DateTime(fmt.to_string()));
                    }
                }
            }
            letter => match lookup_directive(letter) {
                Some(item) => {
                    push_literal(&mut items, &mut literal);
                    items.push(item);
                }
                None => {
                    literal.push_str(FMT_ERROR);
                    literal.push(letter);
                }
            },
        }
    }

    push_literal(&mut items, &mut literal);
    items
}

/// Split an optional `{FMT}` block off the text following `%d`.
///
/// Returns the format (if a block is present) and the number of bytes consumed.
/// An unterminated block takes the rest of the pattern.
fn split_time_format(rest: &str) -> (Option<&str>, usize) {
    match rest.strip_prefix('{') {
        Some(body) => match body.find('}') {
            Some(end) => (Some(&body[..end]), end + 2),
            None => (Some(body), rest.len()),
        },
        None => (None, 0),
    }
}

fn is_valid_time_format(fmt: &str) -> bool {
    !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

fn push_literal(items: &mut Vec<FormatItem>, literal: &mut String) {
    if !literal.is_empty() {
        items.push(FormatItem::Literal(std::mem::take(literal)));
    }
}
