//! The four copy pipelines behind the command-line front ends
//!
//! Each pipeline opens what it needs, moves the bytes once, and releases
//! descriptors and mappings on every exit path through their guards.

use crate::bulk::{copy_all, BulkCopy, PortableCopy};
use crate::fd::{file_status, open_for_reading, open_for_writing, read_all, write_all};
use crate::mmap::{
    memory_map_for_reading, memory_sync, open_and_memory_map_for_writing, MappedRegion,
};
use copyperf_types::{
    BufferSize, CopyReport, CopyStrategy, Error, FileStatus, Operation, Result,
};
use std::io;
use std::path::Path;
use tracing::{info, warn};

fn mapping_length(status: &FileStatus, path: &Path) -> Result<usize> {
    usize::try_from(status.size).map_err(|_| {
        Error::os_at(Operation::Map, path, io::Error::from_raw_os_error(libc::EFBIG))
    })
}

fn finish(strategy: CopyStrategy, source: &Path, destination: &Path, bytes: u64) -> CopyReport {
    info!(
        "{}: copied {} bytes from {} to {}",
        strategy,
        bytes,
        source.display(),
        destination.display()
    );
    CopyReport::new(strategy, bytes)
}

/// Whole-file copy with the platform's fastest mechanism
pub fn copy<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<CopyReport> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    let bytes = copy_all(source, destination)?;
    Ok(finish(CopyStrategy::Copy, source, destination, bytes))
}

/// Read into a user-space buffer of `buffer_size` bytes and write it out, until end of file
pub fn read_write<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    buffer_size: BufferSize,
) -> Result<CopyReport> {
    let (source, destination) = (source.as_ref(), destination.as_ref());
    let bytes = PortableCopy::with_buffer_size(buffer_size).copy_all(source, destination)?;
    Ok(finish(CopyStrategy::ReadWrite, source, destination, bytes))
}

/// Map the destination writable at the source's size and `read` the source into it
pub fn read_mmap<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<CopyReport> {
    let (source, destination) = (source.as_ref(), destination.as_ref());

    let source_fd = open_for_reading(source)?;
    let status = file_status(&source_fd).map_err(|e| e.with_path(source))?;
    let length = mapping_length(&status, source)?;

    let mut mapping = open_and_memory_map_for_writing(destination, status.permissions(), length)?;
    let count = read_all(&source_fd, mapping.as_mut_slice()).map_err(|e| e.with_path(source))?;
    if count < length {
        warn!(
            "{} shrank while copying: read {} of {} bytes",
            source.display(),
            count,
            length
        );
    }
    memory_sync(&mapping).map_err(|e| e.with_path(destination))?;

    Ok(finish(CopyStrategy::ReadMmap, source, destination, count as u64))
}

/// Map the source read-only and `write` the whole mapping to the destination
pub fn mmap_write<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<CopyReport> {
    let (source, destination) = (source.as_ref(), destination.as_ref());

    let source_fd = open_for_reading(source)?;
    let status = file_status(&source_fd).map_err(|e| e.with_path(source))?;
    let length = mapping_length(&status, source)?;
    let mapping = memory_map_for_reading(&source_fd, length).map_err(|e| e.with_path(source))?;

    let destination_fd = open_for_writing(destination, status.permissions())?;
    let written =
        write_all(&destination_fd, mapping.as_slice()).map_err(|e| e.with_path(destination))?;

    Ok(finish(CopyStrategy::MmapWrite, source, destination, written as u64))
}

/// Run `strategy`. `buffer_size` only matters for [`CopyStrategy::ReadWrite`].
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    strategy: CopyStrategy,
    source: P,
    destination: Q,
    buffer_size: BufferSize,
) -> Result<CopyReport> {
    match strategy {
        CopyStrategy::Copy => copy(source, destination),
        CopyStrategy::ReadWrite => read_write(source, destination, buffer_size),
        CopyStrategy::ReadMmap => read_mmap(source, destination),
        CopyStrategy::MmapWrite => mmap_write(source, destination),
    }
}
