//! macOS whole-file copy through `copyfile(3)`

use crate::bulk::BulkCopy;
use copyperf_types::{Error, Operation, Result};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;
use tracing::debug;

/// Native whole-file copy, data and metadata (`COPYFILE_ALL`)
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyfileCopy;

impl CopyfileCopy {
    /// Create the copier
    pub fn new() -> Self {
        Self
    }
}

fn c_path(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        Error::invalid_argument(format!("path \"{}\" contains a NUL byte", path.display()))
    })
}

impl BulkCopy for CopyfileCopy {
    fn name(&self) -> &'static str {
        "copyfile"
    }

    fn copy_all(&self, source: &Path, destination: &Path) -> Result<u64> {
        let source_cstr = c_path(source)?;
        let destination_cstr = c_path(destination)?;

        // SAFETY: both paths are NUL-terminated and outlive the call; a null
        // state asks copyfile to manage its own.
        let rc = unsafe {
            libc::copyfile(
                source_cstr.as_ptr(),
                destination_cstr.as_ptr(),
                ptr::null_mut(),
                libc::COPYFILE_ALL,
            )
        };
        if rc < 0 {
            return Err(Error::last_os_error(Operation::Copy).with_path(destination));
        }

        let bytes = std::fs::metadata(destination)
            .map_err(|e| Error::os_at(Operation::Stat, destination, e))?
            .len();
        debug!("copyfile copied {} bytes", bytes);
        Ok(bytes)
    }
}
