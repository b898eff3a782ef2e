//! Process-wide logging for ntprims
//!
//! Library code logs through the free functions below. Nothing is written
//! until [`init`] installs a logger, so embedding the library costs nothing
//! unless the host opts in.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Global logger instance
static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

enum Sink {
    Stderr,
    File(File),
}

/// Main logger struct
pub struct Logger {
    sink: Sink,
    min_level: LogLevel,
}

impl Logger {
    fn to_stderr(min_level: LogLevel) -> Self {
        Self {
            sink: Sink::Stderr,
            min_level,
        }
    }

    fn to_file(path: &Path, min_level: LogLevel) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            sink: Sink::File(file),
            min_level,
        })
    }

    fn log(&mut self, level: LogLevel, module: &str, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let entry = format!(
            "[{:013}] [{:5}] [{}] {}\n",
            timestamp, level, module, message
        );

        let _ = match self.sink {
            Sink::Stderr => io::stderr().write_all(entry.as_bytes()),
            Sink::File(ref mut file) => file.write_all(entry.as_bytes()),
        };
    }

    fn flush(&mut self) {
        let _ = match self.sink {
            Sink::Stderr => io::stderr().flush(),
            Sink::File(ref mut file) => file.flush(),
        };
    }
}

/// Where log lines go and how verbose they are
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub min_level: LogLevel,
    /// Append to this file instead of stderr
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Warn,
            path: None,
        }
    }
}

/// Initialize the global logger. Later calls are ignored.
pub fn init(config: &LogConfig) -> io::Result<()> {
    let logger = match config.path {
        Some(ref path) => Logger::to_file(path, config.min_level)?,
        None => Logger::to_stderr(config.min_level),
    };
    let _ = LOGGER.set(Mutex::new(logger));
    Ok(())
}

/// Whether a message at `level` would be written; lets callers skip
/// formatting when nothing is listening
pub fn enabled(level: LogLevel) -> bool {
    LOGGER
        .get()
        .is_some_and(|logger| level >= logger.lock().min_level)
}

fn log(level: LogLevel, module: &str, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.lock().log(level, module, message);
    }
}

/// Log debug message
pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

/// Log info message
pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

/// Log warning message
pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

/// Log error message
pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

pub fn flush() {
    if let Some(logger) = LOGGER.get() {
        logger.lock().flush();
    }
}

/// Write a separator line for readability
pub fn separator(label: &str) {
    let msg = format!("========== {} ==========", label);
    info("---", &msg);
}
