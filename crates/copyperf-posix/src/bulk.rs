//! Whole-file copy capability
//!
//! A [`BulkCopy`] moves an entire file in one call and manages its own
//! descriptors. The platform implementation is chosen at build time:
//!
//! - **Linux**: [`SendfileCopy`], kernel-mediated `sendfile`
//! - **macOS**: [`CopyfileCopy`], `copyfile(3)` with `COPYFILE_ALL`
//! - **other Unix**: [`PortableCopy`], a page-sized read/write loop

use crate::fd::{
    file_mode, open_for_reading, open_for_writing, page_buffer_size, read_all, write_all,
};
use copyperf_types::{BufferSize, Result};
use std::path::Path;
use tracing::debug;

#[cfg(target_os = "linux")]
pub use crate::linux::SendfileCopy;

#[cfg(target_os = "macos")]
pub use crate::macos::CopyfileCopy;

/// A mechanism that copies a whole file from one path to another
pub trait BulkCopy {
    /// Short name of the mechanism, for logs and benchmark labels
    fn name(&self) -> &'static str;

    /// Copy `source` to `destination`, creating or truncating the destination,
    /// and return the number of bytes copied.
    ///
    /// A newly created destination gets the source's permission bits.
    fn copy_all(&self, source: &Path, destination: &Path) -> Result<u64>;
}

/// Read/write loop usable on any Unix
#[derive(Debug, Clone, Copy)]
pub struct PortableCopy {
    buffer_size: BufferSize,
}

impl PortableCopy {
    /// Copy through a buffer of one memory page
    pub fn new() -> Self {
        Self::with_buffer_size(page_buffer_size())
    }

    /// Copy through a buffer of `buffer_size` bytes
    pub fn with_buffer_size(buffer_size: BufferSize) -> Self {
        Self { buffer_size }
    }

    /// Size of the intermediate buffer
    pub fn buffer_size(&self) -> BufferSize {
        self.buffer_size
    }
}

impl Default for PortableCopy {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkCopy for PortableCopy {
    fn name(&self) -> &'static str {
        "read-write loop"
    }

    fn copy_all(&self, source: &Path, destination: &Path) -> Result<u64> {
        let source_fd = open_for_reading(source)?;
        let mode = file_mode(&source_fd).map_err(|e| e.with_path(source))?;
        let destination_fd = open_for_writing(destination, mode)?;

        let mut buffer = vec![0u8; self.buffer_size.get()];
        let mut total = 0u64;
        loop {
            let count = read_all(&source_fd, &mut buffer).map_err(|e| e.with_path(source))?;
            if count == 0 {
                break;
            }
            write_all(&destination_fd, &buffer[..count])
                .map_err(|e| e.with_path(destination))?;
            total += count as u64;
        }

        debug!("Portable copy moved {} bytes", total);
        Ok(total)
    }
}

/// The fastest whole-file copy this platform offers
#[cfg(target_os = "linux")]
pub fn platform_copier() -> SendfileCopy {
    SendfileCopy::new()
}

/// The fastest whole-file copy this platform offers
#[cfg(target_os = "macos")]
pub fn platform_copier() -> CopyfileCopy {
    CopyfileCopy::new()
}

/// The fastest whole-file copy this platform offers
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn platform_copier() -> PortableCopy {
    PortableCopy::new()
}

/// Copy `source` to `destination` with [`platform_copier`]
pub fn copy_all<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<u64> {
    let copier = platform_copier();
    debug!("Copying with {}", copier.name());
    copier.copy_all(source.as_ref(), destination.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use copyperf_types::Operation;
    use rstest::rstest;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn patterned(size: usize) -> Vec<u8> {
        (0..size).map(|i| ((i * 7 + 13) % 256) as u8).collect()
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(5)]
    #[case(4097)]
    #[case(1024 * 1024 + 3)]
    fn test_copy_all_is_byte_identical(#[case] size: usize) {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.bin");
        let destination = temp_dir.path().join("dest.bin");
        let data = patterned(size);
        fs::write(&source, &data).unwrap();

        assert_eq!(copy_all(&source, &destination).unwrap(), size as u64);
        assert_eq!(fs::read(&destination).unwrap(), data);
    }

    #[rstest]
    #[case(BufferSize::new(1).unwrap())]
    #[case(BufferSize::new(3).unwrap())]
    #[case(page_buffer_size())]
    fn test_portable_copy_with_buffer(#[case] buffer_size: BufferSize) {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.bin");
        let destination = temp_dir.path().join("dest.bin");
        let data = patterned(10_000);
        fs::write(&source, &data).unwrap();

        let copier = PortableCopy::with_buffer_size(buffer_size);
        assert_eq!(copier.buffer_size(), buffer_size);
        assert_eq!(copier.copy_all(&source, &destination).unwrap(), 10_000);
        assert_eq!(fs::read(&destination).unwrap(), data);
    }

    #[test]
    fn test_copy_all_propagates_mode() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.sh");
        let destination = temp_dir.path().join("dest.sh");
        fs::write(&source, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o750)).unwrap();

        copy_all(&source, &destination).unwrap();
        let mode = fs::metadata(&destination).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn test_copy_all_truncates_existing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a.txt");
        let destination = temp_dir.path().join("b.txt");
        fs::write(&source, b"hello").unwrap();
        fs::write(&destination, b"a much longer previous file").unwrap();

        copy_all(&source, &destination).unwrap();
        assert_eq!(fs::read(&destination).unwrap(), b"hello");
    }

    #[test]
    fn test_copy_all_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("missing.txt");
        let destination = temp_dir.path().join("dest.txt");

        let error = copy_all(&source, &destination).unwrap_err();
        assert_eq!(error.raw_os_error(), Some(libc::ENOENT));
        assert!(!destination.exists());
    }

    #[test]
    fn test_portable_copy_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("missing.txt");
        let destination = temp_dir.path().join("dest.txt");

        let error = PortableCopy::new()
            .copy_all(&source, &destination)
            .unwrap_err();
        assert_eq!(error.operation(), Some(Operation::Open));
        assert_eq!(error.path(), Some(source.as_path()));
    }

    #[test]
    fn test_platform_copier_has_a_name() {
        assert!(!platform_copier().name().is_empty());
        assert!(!PortableCopy::default().name().is_empty());
    }
}
