//! Unsigned 64-bit value type
//!
//! Arithmetic wraps modulo 2^64 the way a fixed-width register does.
//! Division and remainder are the only fallible operations.

use crate::error::{PrimError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// An immutable unsigned 64-bit integer with wraparound arithmetic
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Uint64(u64);

// Named after the operations they expose; the std operator traits are
// implemented separately below and agree with these.
#[allow(clippy::should_implement_trait)]
impl Uint64 {
    pub const ZERO: Uint64 = Uint64(0);
    pub const MAX: Uint64 = Uint64(u64::MAX);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Build a value from its lower and upper 32-bit words
    pub const fn from_words(lower: u32, upper: u32) -> Self {
        Self((upper as u64) << 32 | lower as u64)
    }

    /// Build a value whose upper word is zero
    pub const fn from_lower(lower: u32) -> Self {
        Self::from_words(lower, 0)
    }

    /// Split into `(lower, upper)` 32-bit words
    pub const fn to_words(self) -> (u32, u32) {
        ((self.0 & 0xFFFF_FFFF) as u32, (self.0 >> 32) as u32)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub fn add(self, rhs: impl Into<Uint64>) -> Self {
        Self(self.0.wrapping_add(rhs.into().0))
    }

    pub fn sub(self, rhs: impl Into<Uint64>) -> Self {
        Self(self.0.wrapping_sub(rhs.into().0))
    }

    pub fn mul(self, rhs: impl Into<Uint64>) -> Self {
        Self(self.0.wrapping_mul(rhs.into().0))
    }

    /// Truncating division
    pub fn div(self, rhs: impl Into<Uint64>) -> Result<Self> {
        self.0
            .checked_div(rhs.into().0)
            .map(Self)
            .ok_or(PrimError::DivisionByZero)
    }

    /// Remainder matching [`Uint64::div`]
    pub fn rem(self, rhs: impl Into<Uint64>) -> Result<Self> {
        self.0
            .checked_rem(rhs.into().0)
            .map(Self)
            .ok_or(PrimError::DivisionByZero)
    }

    pub fn eq(self, rhs: impl Into<Uint64>) -> bool {
        self.0 == rhs.into().0
    }

    pub fn lt(self, rhs: impl Into<Uint64>) -> bool {
        self.0 < rhs.into().0
    }

    pub fn le(self, rhs: impl Into<Uint64>) -> bool {
        self.0 <= rhs.into().0
    }

    /// Nearest `f64`; values above 2^53 lose their low bits
    pub fn to_approx_f64(self) -> f64 {
        self.0 as f64
    }
}

impl From<u64> for Uint64 {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for Uint64 {
    fn from(value: u32) -> Self {
        Self(value as u64)
    }
}

impl From<u16> for Uint64 {
    fn from(value: u16) -> Self {
        Self(value as u64)
    }
}

impl From<u8> for Uint64 {
    fn from(value: u8) -> Self {
        Self(value as u64)
    }
}

impl From<Uint64> for u64 {
    fn from(value: Uint64) -> Self {
        value.0
    }
}

impl fmt::Display for Uint64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uint64 {
    type Err = PrimError;

    /// Parse plain decimal digits, as produced by `Display`
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PrimError::InvalidNumber(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| PrimError::InvalidNumber(s.to_string()))
    }
}

// Operators wrap; the same operand may sit on either side.
macro_rules! wrapping_op {
    ($trait:ident, $method:ident, $op:ident) => {
        impl $trait for Uint64 {
            type Output = Uint64;
            fn $method(self, rhs: Uint64) -> Uint64 {
                Uint64(self.0.$op(rhs.0))
            }
        }

        impl $trait<u64> for Uint64 {
            type Output = Uint64;
            fn $method(self, rhs: u64) -> Uint64 {
                Uint64(self.0.$op(rhs))
            }
        }

        impl $trait<Uint64> for u64 {
            type Output = Uint64;
            fn $method(self, rhs: Uint64) -> Uint64 {
                Uint64(self.$op(rhs.0))
            }
        }
    };
}

wrapping_op!(Add, add, wrapping_add);
wrapping_op!(Sub, sub, wrapping_sub);
wrapping_op!(Mul, mul, wrapping_mul);
