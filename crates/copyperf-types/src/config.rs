//! Configuration types for copyperf
//!
//! There is no configuration file: the only tunable is the chunk size used
//! by the buffered read/write pipeline, validated here so that every entry
//! point rejects the same values with the same message.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Read/write chunk size in bytes, always at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferSize(usize);

impl BufferSize {
    /// Smallest accepted buffer size
    pub const MIN: usize = 1;
    /// Page size assumed when the OS cannot be asked
    pub const FALLBACK_PAGE: usize = 4096;

    /// Create a new buffer size with validation
    pub fn new(size: usize) -> Result<Self> {
        if size < Self::MIN {
            Err(Error::invalid_argument(
                "--buffer argument must be at least 1.",
            ))
        } else {
            Ok(Self(size))
        }
    }

    /// Get the buffer size value
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BufferSize {
    fn default() -> Self {
        Self(Self::FALLBACK_PAGE)
    }
}

impl fmt::Display for BufferSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BufferSize {
    type Err = Error;

    /// Parse a command-line value. Negative numbers are parsed so that they
    /// fail validation rather than integer parsing.
    fn from_str(value: &str) -> Result<Self> {
        let size: i64 = value.trim().parse().map_err(|_| {
            Error::invalid_argument(format!(
                "\"{}\" is not a valid integer argument for --buffer",
                value
            ))
        })?;
        if size < Self::MIN as i64 {
            return Err(Error::invalid_argument(
                "--buffer argument must be at least 1.",
            ));
        }
        let size = usize::try_from(size).map_err(|_| {
            Error::invalid_argument(format!("--buffer argument {} is too large", size))
        })?;
        Self::new(size)
    }
}
