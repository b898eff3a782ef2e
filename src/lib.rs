//! ntprims - primitives for file metadata tooling
//!
//! Three small building blocks that need exact arithmetic:
//!
//! - **Date-time parsing**: ISO-8601-like text to Unix seconds and nanoseconds
//! - **DOSATTRIB encoding**: the `user.DOSATTRIB` extended-attribute blob,
//!   with the creation time stored as NT ticks
//! - **Uint64**: unsigned 64-bit values with wraparound arithmetic
//!
//! # Example
//!
//! ```
//! use ntprims::{encode_dos_attrib_at, parse_datetime, DosInfo, Uint64};
//!
//! fn main() -> ntprims::Result<()> {
//!     let created = parse_datetime("2020-02-29T12:34:56.5+09:00")?;
//!     let blob = encode_dos_attrib_at(0x20, created);
//!     assert!(blob.starts_with(b"0x20\0"));
//!
//!     let info = DosInfo::from_bytes(&blob)?;
//!     assert_eq!(info.create_time(), created);
//!
//!     let (lower, upper) = Uint64::new(info.create_time).to_words();
//!     assert_eq!(Uint64::from_words(lower, upper).get(), info.create_time);
//!     Ok(())
//! }
//! ```

pub mod datetime;
pub mod dosattrib;
pub mod error;
pub mod logging;
pub mod uint64;

// Re-export main types
pub use datetime::{encode_unix_time, parse_datetime, EpochTimestamp, ParsedDateTime};
pub use dosattrib::{
    encode_dos_attrib, encode_dos_attrib_at, file_attributes, timespec_to_nttime, AttribWriter,
    DosInfo,
};
pub use error::{PrimError, Result};
pub use uint64::Uint64;

use logging::{LogConfig, LogLevel};
use std::path::PathBuf;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Render bytes as lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Parse hex text (whitespace ignored) back into bytes
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(PrimError::InvalidNumber(text.to_string()));
    }
    digits
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| PrimError::InvalidNumber(text.to_string()))
        })
        .collect()
}

/// How the CLI prints results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Minimum level written to the log
    pub log_level: LogLevel,
    /// Log to this file instead of stderr
    pub log_file: Option<PathBuf>,
    pub output: OutputFormat,
}

impl AppConfig {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            min_level: self.log_level,
            path: self.log_file.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            log_file: None,
            output: OutputFormat::Text,
        }
    }
}
