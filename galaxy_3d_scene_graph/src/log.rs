//! Logging for the scene graph.
//!
//! Graph code reports through the `graph_*!` macros. Entries go to one
//! process-wide [`Logger`], a colored console logger until replaced. Entries
//! below the minimum severity are dropped before their message is formatted.

use colored::*;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Destination of graph log entries. Install one with [`set_logger`].
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Reporting component, e.g. "galaxy3d::GraphLock"
    pub source: String,
    pub message: String,
    /// Call site, set by `graph_error!` only
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogSeverity {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogSeverity::Trace,
            1 => LogSeverity::Debug,
            2 => LogSeverity::Info,
            3 => LogSeverity::Warn,
            _ => LogSeverity::Error,
        }
    }

    fn label(self) -> ColoredString {
        match self {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        }
    }
}

/// Console logger: `[time] [SEVERITY] [source] message (file:line)`.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let time: DateTime<Local> = entry.timestamp.into();
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };
        println!(
            "[{}] [{}] [{}] {}{}",
            time.format("%H:%M:%S%.3f"),
            entry.severity.label(),
            entry.source.bright_blue(),
            entry.message,
            location
        );
    }
}

// ===== GLOBAL LOGGER =====

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(LogSeverity::Info as u8);

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Route every later entry to `logger`.
pub fn set_logger<L: Logger + 'static>(logger: L) {
    if let Ok(mut slot) = logger_slot().write() {
        *slot = Box::new(logger);
    }
}

/// Go back to the console logger.
pub fn reset_logger() {
    if let Ok(mut slot) = logger_slot().write() {
        *slot = Box::new(DefaultLogger);
    }
}

/// Drop entries below `severity`. Info by default.
pub fn set_min_severity(severity: LogSeverity) {
    MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
}

pub fn min_severity() -> LogSeverity {
    LogSeverity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
}

pub fn enabled(severity: LogSeverity) -> bool {
    severity >= min_severity()
}

fn dispatch(severity: LogSeverity, source: &str, message: String, location: Option<(&'static str, u32)>) {
    if !enabled(severity) {
        return;
    }
    if let Ok(slot) = logger_slot().read() {
        slot.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: location.map(|(file, _)| file),
            line: location.map(|(_, line)| line),
        });
    }
}

/// Backend of the `graph_*!` macros.
pub fn log(severity: LogSeverity, source: &str, message: String) {
    dispatch(severity, source, message, None);
}

/// Same as [`log`], with the call site attached.
pub fn log_detailed(severity: LogSeverity, source: &str, message: String, file: &'static str, line: u32) {
    dispatch(severity, source, message, Some((file, line)));
}

// ===== LOGGING MACROS =====

#[macro_export]
macro_rules! graph_trace {
    ($source:expr, $($arg:tt)*) => {
        if $crate::log::enabled($crate::galaxy3d::log::LogSeverity::Trace) {
            $crate::log::log(
                $crate::galaxy3d::log::LogSeverity::Trace,
                $source,
                format!($($arg)*)
            )
        }
    };
}

/// Split/merge and other index events.
#[macro_export]
macro_rules! graph_debug {
    ($source:expr, $($arg:tt)*) => {
        if $crate::log::enabled($crate::galaxy3d::log::LogSeverity::Debug) {
            $crate::log::log(
                $crate::galaxy3d::log::LogSeverity::Debug,
                $source,
                format!($($arg)*)
            )
        }
    };
}

#[macro_export]
macro_rules! graph_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log(
            $crate::galaxy3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Used for cancelled lock waits.
#[macro_export]
macro_rules! graph_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log(
            $crate::galaxy3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Logs with the call site, see [`log_detailed`](crate::log::log_detailed).
#[macro_export]
macro_rules! graph_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log_detailed(
            $crate::galaxy3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
