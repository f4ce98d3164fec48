//! Linux whole-file copy through `sendfile`

use crate::bulk::BulkCopy;
use crate::fd::{file_status, open_for_reading, open_for_writing, retry_on_interrupt};
use copyperf_types::{Error, Operation, Result};
use std::os::fd::AsRawFd;
use std::path::Path;
use std::ptr;
use tracing::debug;

/// Largest count a single `sendfile` call transfers on Linux
const MAX_SENDFILE_CHUNK: usize = 0x7fff_f000;

/// Kernel-mediated copy: bytes never enter user space
#[derive(Debug, Clone, Copy, Default)]
pub struct SendfileCopy;

impl SendfileCopy {
    /// Create the copier
    pub fn new() -> Self {
        Self
    }
}

impl BulkCopy for SendfileCopy {
    fn name(&self) -> &'static str {
        "sendfile"
    }

    fn copy_all(&self, source: &Path, destination: &Path) -> Result<u64> {
        let source_fd = open_for_reading(source)?;
        let status = file_status(&source_fd).map_err(|e| e.with_path(source))?;
        let destination_fd = open_for_writing(destination, status.permissions())?;

        let mut total = 0u64;
        while total < status.size {
            let remaining = status.size - total;
            let chunk = usize::try_from(remaining)
                .unwrap_or(MAX_SENDFILE_CHUNK)
                .min(MAX_SENDFILE_CHUNK);
            // SAFETY: both descriptors are open for the duration; a null offset
            // makes the kernel advance the source file position.
            let sent = retry_on_interrupt(|| unsafe {
                libc::sendfile(
                    destination_fd.as_raw_fd(),
                    source_fd.as_raw_fd(),
                    ptr::null_mut(),
                    chunk,
                )
            })
            .map_err(|e| Error::os_at(Operation::Copy, destination, e))?;

            if sent == 0 {
                // The source shrank underneath us.
                break;
            }
            total += sent as u64;
            debug!(
                "sendfile sent {} bytes, {} remaining",
                sent,
                status.size - total
            );
        }
        Ok(total)
    }
}
