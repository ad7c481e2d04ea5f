use std::{fmt, io::Write};

use chrono::{DateTime, Utc};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

struct WindowState {
    entries: Vec<LogEntry>,
    writer: Option<Box<dyn Write + Send>>,
}

/// The script-facing log window. When the window is not open, every call is
/// silently ignored: no error, no buffering. Messages are always mirrored to
/// the host's own tracing output.
pub struct LogWindow {
    window: Option<WindowState>,
}

impl fmt::Debug for LogWindow {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LogWindow")
            .field("open", &self.window.is_some())
            .finish()
    }
}

impl Default for LogWindow {
    fn default() -> Self {
        Self::closed()
    }
}

impl LogWindow {
    /// A log window that is not open; print calls become no-ops.
    #[must_use]
    pub fn closed() -> Self {
        Self { window: None }
    }

    #[must_use]
    pub fn open() -> Self {
        Self {
            window: Some(WindowState {
                entries: Vec::new(),
                writer: None,
            }),
        }
    }

    /// Opens the window with an attached line writer (a transcript file,
    /// test buffer, ...).
    #[must_use]
    pub fn open_with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            window: Some(WindowState {
                entries: Vec::new(),
                writer: Some(writer),
            }),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn print_info(&mut self, message: &str) {
        tracing::info!(target: "script", "{message}");
        self.push(LogLevel::Info, message);
    }

    pub fn print_warning(&mut self, message: &str) {
        tracing::warn!(target: "script", "{message}");
        self.push(LogLevel::Warning, message);
    }

    pub fn print_error(&mut self, message: &str) {
        tracing::error!(target: "script", "{message}");
        self.push(LogLevel::Error, message);
    }

    /// Clears the window contents. Ignored when the window is not open.
    pub fn clear(&mut self) {
        if let Some(window) = &mut self.window {
            window.entries.clear();
        }
    }

    /// Entries currently shown; empty when the window is not open.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        self.window
            .as_ref()
            .map_or(&[], |window| window.entries.as_slice())
    }

    fn push(&mut self, level: LogLevel, message: &str) {
        let Some(window) = &mut self.window else {
            return;
        };

        let entry = LogEntry {
            at: Utc::now(),
            level,
            message: message.to_string(),
        };
        if let Some(writer) = &mut window.writer {
            let line = format!(
                "{} [{level}] {message}\n",
                entry.at.format("%H:%M:%S%.3f")
            );
            if writer.write_all(line.as_bytes()).is_err() {
                // A broken sink must never surface to the script.
                warn!("log window writer failed, detaching");
                window.writer = None;
            }
        }
        window.entries.push(entry);
    }
}
