//! Size-rolled file appender
//!
//! Each file is named `prefix + UTC timestamp + suffix` inside a directory.
//! Before every write the current file is measured; once it is larger than
//! the configured number of MiB a new file is started and the old one is left
//! untouched.

use super::render;
use crate::core::{Appender, AppenderId, Formatter, LogEvent, LoggerError, Result};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Size limit used when none is configured
pub const DEFAULT_MAX_SIZE_MIB: u64 = 8;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub struct RollFileAppender {
    id: AppenderId,
    dir: PathBuf,
    prefix: String,
    suffix: String,
    max_size_mib: u64,
    current_path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    formatter: Option<Arc<Formatter>>,
    rotation_count: u64,
}

impl RollFileAppender {
    /// Create the appender and its first file, reporting failure to stderr.
    ///
    /// A zero size limit, an unusable directory or an unopenable file leave
    /// the appender inert: events are silently discarded.
    pub fn new(
        dir: impl Into<PathBuf>,
        max_size_mib: u64,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        let dir = dir.into();
        let prefix = prefix.into();
        let suffix = suffix.into();
        match Self::try_new(dir.clone(), max_size_mib, prefix.clone(), suffix.clone()) {
            Ok(appender) => appender,
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] RollFileAppender in '{}' is disabled: {}",
                    dir.display(),
                    e
                );
                Self::inert(dir, max_size_mib, prefix, suffix)
            }
        }
    }

    /// Create the appender and its first file
    ///
    /// # Errors
    ///
    /// Returns error if `max_size_mib` is zero, or the directory or first
    /// file cannot be created
    pub fn try_new(
        dir: impl Into<PathBuf>,
        max_size_mib: u64,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self> {
        let mut appender = Self::inert(dir.into(), max_size_mib, prefix.into(), suffix.into());

        if max_size_mib == 0 {
            return Err(LoggerError::config(
                "RollFileAppender",
                "max file size must be at least 1 MiB",
            ));
        }

        fs::create_dir_all(&appender.dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", appender.dir.display()),
                e,
            )
        })?;

        appender.open_new_file()?;
        Ok(appender)
    }

    fn inert(dir: PathBuf, max_size_mib: u64, prefix: String, suffix: String) -> Self {
        Self {
            id: AppenderId::roll_file(&dir, &prefix, &suffix),
            dir,
            prefix,
            suffix,
            max_size_mib,
            current_path: None,
            writer: None,
            formatter: None,
            rotation_count: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File currently written to, `None` for an inert appender
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn max_size_mib(&self) -> u64 {
        self.max_size_mib
    }

    /// Number of files started after the first one
    pub fn rotation_count(&self) -> u64 {
        self.rotation_count
    }

    /// `prefix + stamp + suffix`, with `.seq` before the suffix for `seq > 0`
    fn file_path(&self, stamp: &str, seq: u32) -> PathBuf {
        let name = if seq == 0 {
            format!("{}{}{}", self.prefix, stamp, self.suffix)
        } else {
            format!("{}{}.{}{}", self.prefix, stamp, seq, self.suffix)
        };
        self.dir.join(name)
    }

    /// Create the next timestamped file. A name that is already taken, by
    /// this process or another one, is never reopened.
    fn open_new_file(&mut self) -> Result<()> {
        let stamp = Utc::now().format(FILE_TIMESTAMP_FORMAT).to_string();
        let mut seq = 0u32;
        loop {
            let path = self.file_path(&stamp, seq);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    self.writer = Some(BufWriter::new(file));
                    self.current_path = Some(path);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => seq += 1,
                Err(e) => {
                    return Err(LoggerError::file_appender(
                        path.display().to_string(),
                        format!("Failed to open: {}", e),
                    ))
                }
            }
        }
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.dir.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        self.open_new_file().map_err(|e| {
            LoggerError::file_rotation(self.dir.display().to_string(), e.to_string())
        })?;
        self.rotation_count += 1;
        Ok(())
    }

    /// A file that cannot be measured counts as full
    fn should_rotate(&self, path: &Path) -> bool {
        match fs::metadata(path) {
            Ok(meta) => meta.len() as f64 / BYTES_PER_MIB > self.max_size_mib as f64,
            Err(_) => true,
        }
    }
}

impl Appender for RollFileAppender {
    fn id(&self) -> &AppenderId {
        &self.id
    }

    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let Some(path) = self.current_path.clone() else {
            return Ok(());
        };

        if self.writer.is_none() || self.should_rotate(&path) {
            self.rotate()?;
        }

        let output = render(self.formatter.as_ref(), &self.id, event)?;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Roll file writer not initialized"))?;

        writer
            .write_all(output.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
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

impl Drop for RollFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
