//! Error types for ntprims
//!
//! Overflow and out-of-range calendar fields are deliberately absent:
//! both are defined behavior, never faults.

use thiserror::Error;

/// Main error type for ntprims operations
#[derive(Error, Debug)]
pub enum PrimError {
    /// The date-time text did not match the accepted grammar
    #[error("parser error")]
    Parse,

    #[error("division by zero")]
    DivisionByZero,

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Invalid DOSATTRIB blob: {0}")]
    InvalidBlob(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ntprims operations
pub type Result<T> = std::result::Result<T, PrimError>;

impl PrimError {
    /// Check if this error came out of `Uint64` arithmetic
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, PrimError::DivisionByZero)
    }
}
