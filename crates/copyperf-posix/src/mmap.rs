//! Memory-mapping primitives
//!
//! Mappings are owning guards: dropping one unmaps it, and a writable
//! mapping also owns the descriptor of its file, which is closed only after
//! the region is gone. Zero-length regions never reach `mmap` (which rejects
//! them), so empty files map to empty slices.

use crate::fd::{open_for_reading_and_writing, truncate};
use copyperf_types::{Error, Operation, Result};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use std::path::Path;
use std::ptr::{self, NonNull};
use std::slice;
use tracing::{debug, warn};

/// Common behaviour of the mapping guards
pub trait MappedRegion {
    /// Mapped bytes
    fn as_slice(&self) -> &[u8];

    /// Remove the mapping, reporting any error instead of logging it
    fn unmap(self) -> Result<()>;

    /// Length of the mapped region in bytes
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the region is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct RawMapping {
    address: NonNull<libc::c_void>,
    length: usize,
}

impl RawMapping {
    fn new(
        fd: BorrowedFd<'_>,
        length: usize,
        protection: libc::c_int,
        flags: libc::c_int,
    ) -> Result<Self> {
        if length == 0 {
            return Ok(Self::empty());
        }

        // SAFETY: a fresh mapping chosen by the kernel; no existing memory is touched.
        let address = unsafe {
            libc::mmap(
                ptr::null_mut(),
                length,
                protection,
                flags,
                fd.as_raw_fd(),
                0,
            )
        };
        if address == libc::MAP_FAILED {
            return Err(Error::last_os_error(Operation::Map));
        }
        let address = NonNull::new(address).ok_or_else(|| {
            Error::os(
                Operation::Map,
                std::io::Error::from_raw_os_error(libc::ENOMEM),
            )
        })?;

        debug!(
            "Mapped {} bytes of fd {} at {:p}",
            length,
            fd.as_raw_fd(),
            address
        );
        Ok(Self { address, length })
    }

    fn empty() -> Self {
        Self {
            address: NonNull::dangling(),
            length: 0,
        }
    }

    fn as_slice(&self) -> &[u8] {
        // SAFETY: the region is mapped readable for `length` bytes until `release`,
        // and a dangling pointer is valid for a zero-length slice.
        unsafe { slice::from_raw_parts(self.address.as_ptr().cast::<u8>(), self.length) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: only writable mappings hand this out; exclusivity follows from `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.address.as_ptr().cast::<u8>(), self.length) }
    }

    fn sync(&self) -> Result<()> {
        if self.length == 0 {
            return Ok(());
        }
        // SAFETY: the region is a live mapping of exactly `length` bytes.
        if unsafe { libc::msync(self.address.as_ptr(), self.length, libc::MS_SYNC) } == -1 {
            return Err(Error::last_os_error(Operation::Sync));
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if self.length == 0 {
            return Ok(());
        }
        let length = std::mem::replace(&mut self.length, 0);
        // SAFETY: the region is a live mapping of `length` bytes and is not used again.
        if unsafe { libc::munmap(self.address.as_ptr(), length) } == -1 {
            return Err(Error::last_os_error(Operation::Unmap));
        }
        debug!("Unmapped {} bytes at {:p}", length, self.address);
        Ok(())
    }
}

impl Drop for RawMapping {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            warn!("Failed to unmap memory: {}", error);
        }
    }
}

/// Private, read-only view of a file
#[derive(Debug)]
pub struct ReadMapping {
    raw: RawMapping,
}

impl MappedRegion for ReadMapping {
    fn as_slice(&self) -> &[u8] {
        self.raw.as_slice()
    }

    fn unmap(mut self) -> Result<()> {
        self.raw.release()
    }
}

/// Shared, writable view of a file, owning that file's descriptor
#[derive(Debug)]
pub struct WriteMapping {
    // Declared before `fd` so the region is unmapped before the descriptor closes.
    raw: RawMapping,
    fd: OwnedFd,
}

impl WriteMapping {
    /// Mapped bytes, writable
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.raw.as_mut_slice()
    }

    /// Descriptor of the mapped file
    pub fn fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }

    /// Flush dirty pages to the file and wait for the write-back to finish
    pub fn sync(&self) -> Result<()> {
        self.raw.sync()
    }
}

impl MappedRegion for WriteMapping {
    fn as_slice(&self) -> &[u8] {
        self.raw.as_slice()
    }

    fn unmap(mut self) -> Result<()> {
        self.raw.release()
    }
}

/// Map the first `count` bytes of the file behind `fd`, privately and read-only
pub fn memory_map_for_reading<Fd: AsFd>(fd: Fd, count: usize) -> Result<ReadMapping> {
    let raw = RawMapping::new(fd.as_fd(), count, libc::PROT_READ, libc::MAP_PRIVATE)?;
    Ok(ReadMapping { raw })
}

/// Open or create `path`, resize it to `count` bytes, and map it shared and writable.
///
/// Bytes in a newly extended region are whatever `ftruncate` leaves there.
/// If resizing or mapping fails, the descriptor is closed before returning.
pub fn open_and_memory_map_for_writing<P: AsRef<Path>>(
    path: P,
    mode: u32,
    count: usize,
) -> Result<WriteMapping> {
    let path = path.as_ref();
    let fd = open_for_reading_and_writing(path, mode)?;
    truncate(&fd, count as u64).map_err(|e| e.with_path(path))?;
    let raw = RawMapping::new(
        fd.as_fd(),
        count,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_SHARED,
    )
    .map_err(|e| e.with_path(path))?;
    Ok(WriteMapping { raw, fd })
}

/// Commit writes made through `mapping` to its file, blocking until done
pub fn memory_sync(mapping: &WriteMapping) -> Result<()> {
    mapping.sync()
}

/// Remove a mapping, reporting failure
pub fn memory_unmap<M: MappedRegion>(mapping: M) -> Result<()> {
    mapping.unmap()
}
