//! Console appender implementation

use super::render;
use crate::core::{Appender, AppenderId, Formatter, LogEvent, Result};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;

/// Writes rendered events to standard error
pub struct ConsoleAppender {
    id: AppenderId,
    formatter: Option<Arc<Formatter>>,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self {
            id: AppenderId::Console,
            formatter: None,
            use_colors: false,
        }
    }

    /// Colour each line by its level
    ///
    /// # Example
    ///
    /// ```
    /// use rust_pattern_logger::appenders::ConsoleAppender;
    ///
    /// let appender = ConsoleAppender::new().with_colors(true);
    /// ```
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Use this formatter instead of the one a logger would attach
    #[must_use]
    pub fn with_formatter(mut self, formatter: Arc<Formatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    fn colorize(&self, event: &LogEvent, output: String) -> String {
        if !self.use_colors {
            return output;
        }
        // keep the line terminator outside the escape sequence
        let body = output.trim_end_matches('\n');
        let newline = &output[body.len()..];
        format!("{}{}", body.color(event.level().color_code()), newline)
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn id(&self) -> &AppenderId {
        &self.id
    }

    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let output = render(self.formatter.as_ref(), &self.id, event)?;
        let output = self.colorize(event, output);

        let mut stderr = std::io::stderr().lock();
        stderr.write_all(output.as_bytes())?;
        stderr.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        std::io::stderr().flush()?;
        Ok(())
    }

    fn set_formatter(&mut self, formatter: Arc<Formatter>) {
        self.formatter = Some(formatter);
    }

    fn has_formatter(&self) -> bool {
        self.formatter.is_some()
    }
}
