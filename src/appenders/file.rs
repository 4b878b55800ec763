//! Single file appender with an exclusive advisory lock

use super::render;
use crate::core::{Appender, AppenderId, Formatter, LogEvent, LoggerError, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writes every event to one file.
///
/// The file is truncated when first opened and held under an exclusive
/// advisory lock, so a second process (or appender) cannot share it.
/// [`reopen`](Self::reopen) reacquires the file in append mode, e.g. after an
/// external tool moved it away.
pub struct SingleFileAppender {
    id: AppenderId,
    path: PathBuf,
    file: Option<File>,
    formatter: Option<Arc<Formatter>>,
}

impl SingleFileAppender {
    /// Open the file, reporting failure to stderr.
    ///
    /// When the file cannot be opened or locked the appender stays inert and
    /// silently discards events.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_new(path.clone()) {
            Ok(appender) => appender,
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] SingleFileAppender for '{}' is disabled: {}",
                    path.display(),
                    e
                );
                Self::inert(path)
            }
        }
    }

    /// Open the file, returning the failure instead of degrading
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be created, opened or locked
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self> {
        let mut appender = Self::inert(path.into());
        appender.file = Some(open_locked(&appender.path, true)?);
        Ok(appender)
    }

    fn inert(path: PathBuf) -> Self {
        Self {
            id: AppenderId::single_file(&path),
            path,
            file: None,
            formatter: None,
        }
    }

    /// Release the current handle and lock, then open the path again for append
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or locked; the appender is
    /// inert afterwards
    pub fn reopen(&mut self) -> Result<()> {
        // dropping the handle releases the lock
        self.file = None;
        self.file = Some(open_locked(&self.path, false)?);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the appender currently holds its file
    pub fn is_active(&self) -> bool {
        self.file.is_some()
    }
}

fn open_locked(path: &Path, truncate: bool) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        })?;

    FileExt::try_lock_exclusive(&file)
        .map_err(|_| LoggerError::file_lock(path.display().to_string()))?;

    // truncate only once the lock is ours
    if truncate {
        file.set_len(0).map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Failed to truncate: {}", e),
            )
        })?;
    }

    Ok(file)
}

impl Appender for SingleFileAppender {
    fn id(&self) -> &AppenderId {
        &self.id
    }

    fn append(&mut self, event: &LogEvent) -> Result<()> {
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let output = render(self.formatter.as_ref(), &self.id, event)?;
        file.write_all(output.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| {
                LoggerError::file_appender(
                    self.path.display().to_string(),
                    format!("Failed to write log entry: {}", e),
                )
            })
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
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

impl Drop for SingleFileAppender {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
