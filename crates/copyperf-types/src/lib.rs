//! Core type system and error handling for copyperf
//!
//! This crate provides the types shared by the POSIX layer, the copy
//! pipelines and the command-line front ends:
//!
//! - **Error handling**: one [`Error`] carrying the failed [`Operation`] and OS error
//! - **Configuration**: validated [`BufferSize`]
//! - **Core types**: [`CopyStrategy`], [`FileStatus`], [`CopyReport`]
//!
//! # Examples
//!
//! ```rust
//! use copyperf_types::{BufferSize, CopyStrategy, Result};
//!
//! fn parse_buffer(value: &str) -> Result<BufferSize> {
//!     value.parse()
//! }
//!
//! assert_eq!(parse_buffer("512").unwrap().get(), 512);
//! assert!(parse_buffer("0").is_err());
//! assert_eq!(CopyStrategy::ReadWrite.program_name(), "read-write");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod types;

// Re-export commonly used types
pub use config::BufferSize;
pub use error::{Error, ErrorKind, Operation};
pub use result::Result;
pub use types::*;
