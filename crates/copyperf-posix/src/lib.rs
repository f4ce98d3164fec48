//! POSIX file operations and copy pipelines for copyperf
//!
//! This crate is a thin layer over the system calls the copy tools are
//! measuring. Nothing here buffers behind the caller's back:
//!
//! - **Descriptors** ([`fd`]): `EINTR`-safe whole-buffer reads and writes,
//!   `O_CLOEXEC` opens, `fstat`, page size
//! - **Mappings** ([`mmap`]): owning guards around `mmap`/`msync`/`munmap`
//! - **Bulk copy** ([`bulk`]): `sendfile` on Linux, `copyfile` on macOS,
//!   a read/write loop elsewhere
//! - **Pipelines** ([`strategy`]): the four ways of copying a file that the
//!   command-line tools expose
//!
//! # Platform Support
//!
//! Unix only. The bulk copy mechanism is selected at compile time.
//!
//! # Examples
//!
//! ```rust,no_run
//! use copyperf_posix::{strategy, page_buffer_size};
//! use copyperf_types::CopyStrategy;
//!
//! let report = strategy::run(CopyStrategy::ReadMmap, "a.txt", "b.txt", page_buffer_size())?;
//! println!("copied {} bytes", report.bytes);
//! # Ok::<(), copyperf_types::Error>(())
//! ```

#![cfg(unix)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bulk;
pub mod fd;
pub mod mmap;
pub mod strategy;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

// Re-export the primitives
pub use bulk::{copy_all, platform_copier, BulkCopy, PortableCopy};
pub use fd::{
    close_file, file_mode, file_status, open_for_reading, open_for_reading_and_writing,
    open_for_writing, page_buffer_size, page_size, read_all, write_all,
};
pub use mmap::{
    memory_map_for_reading, memory_sync, memory_unmap, open_and_memory_map_for_writing,
    MappedRegion, ReadMapping, WriteMapping,
};

#[cfg(target_os = "linux")]
pub use bulk::SendfileCopy;

#[cfg(target_os = "macos")]
pub use bulk::CopyfileCopy;
