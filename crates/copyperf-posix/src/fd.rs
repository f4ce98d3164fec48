//! Descriptor-level primitives: open, read, write, stat, close
//!
//! Every call that can be interrupted by a signal is retried on `EINTR`;
//! any other failure becomes an [`Error::Os`] tagged with the operation.

use copyperf_types::{BufferSize, Error, FileStatus, Operation, Result};
use std::ffi::CString;
use std::io;
use std::mem::MaybeUninit;
use std::os::fd::{AsFd, AsRawFd, FromRawFd, IntoRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tracing::{debug, warn};

/// Issue `call` until it either succeeds or fails with something other than `EINTR`
///
/// `T` is the call's return type (`c_int` or `ssize_t`), which signals
/// failure with `-1`.
pub(crate) fn retry_on_interrupt<T>(mut call: impl FnMut() -> T) -> io::Result<T>
where
    T: Copy + PartialEq + From<i8>,
{
    let failed = T::from(-1);
    loop {
        let rc = call();
        if rc != failed {
            return Ok(rc);
        }
        let error = io::Error::last_os_error();
        if error.kind() != io::ErrorKind::Interrupted {
            return Err(error);
        }
    }
}

/// Read up to `buffer.len()` bytes, stopping early only at end of file.
///
/// Returns the number of bytes read, which is smaller than the buffer only
/// when the end of the file was reached.
pub fn read_all<Fd: AsFd>(fd: Fd, buffer: &mut [u8]) -> Result<usize> {
    let raw = fd.as_fd().as_raw_fd();
    let mut total = 0;
    while total < buffer.len() {
        let remaining = &mut buffer[total..];
        // SAFETY: `remaining` is a live, writable region of exactly the length passed.
        let rc = retry_on_interrupt(|| unsafe {
            libc::read(raw, remaining.as_mut_ptr().cast(), remaining.len())
        })
        .map_err(|e| Error::os(Operation::Read, e))?;
        if rc == 0 {
            break;
        }
        total += rc as usize;
    }
    Ok(total)
}

/// Write the whole of `buffer`.
///
/// Returns `buffer.len()` on success. On failure a prefix of the buffer
/// may already have reached the file.
pub fn write_all<Fd: AsFd>(fd: Fd, buffer: &[u8]) -> Result<usize> {
    let raw = fd.as_fd().as_raw_fd();
    let mut total = 0;
    while total < buffer.len() {
        let remaining = &buffer[total..];
        // SAFETY: `remaining` is a live, readable region of exactly the length passed.
        let rc = retry_on_interrupt(|| unsafe {
            libc::write(raw, remaining.as_ptr().cast(), remaining.len())
        })
        .map_err(|e| Error::os(Operation::Write, e))?;
        if rc == 0 {
            return Err(Error::os(
                Operation::Write,
                io::Error::from(io::ErrorKind::WriteZero),
            ));
        }
        total += rc as usize;
    }
    Ok(total)
}

fn path_to_cstring(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        Error::invalid_argument(format!("path \"{}\" contains a NUL byte", path.display()))
    })
}

fn open_with(path: &Path, flags: libc::c_int, mode: u32) -> Result<OwnedFd> {
    let c_path = path_to_cstring(path)?;
    let permissions: libc::c_uint = mode & 0o7777;
    // SAFETY: `c_path` is NUL-terminated and outlives the call.
    let fd = retry_on_interrupt(|| unsafe {
        libc::open(c_path.as_ptr(), flags | libc::O_CLOEXEC, permissions)
    })
    .map_err(|e| Error::os_at(Operation::Open, path, e))?;

    debug!("Opened {} as fd {}", path.display(), fd);

    // SAFETY: `open` just returned this descriptor and nothing else owns it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Open an existing file for reading
pub fn open_for_reading<P: AsRef<Path>>(path: P) -> Result<OwnedFd> {
    open_with(path.as_ref(), libc::O_RDONLY, 0)
}

/// Open or create a file for writing, truncating existing contents.
///
/// A newly created file gets the permission bits of `mode`, minus the umask.
pub fn open_for_writing<P: AsRef<Path>>(path: P, mode: u32) -> Result<OwnedFd> {
    open_with(
        path.as_ref(),
        libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
        mode,
    )
}

/// Open or create a file for reading and writing, truncating existing contents
pub fn open_for_reading_and_writing<P: AsRef<Path>>(path: P, mode: u32) -> Result<OwnedFd> {
    open_with(
        path.as_ref(),
        libc::O_RDWR | libc::O_CREAT | libc::O_TRUNC,
        mode,
    )
}

/// Close a descriptor, discarding any error.
///
/// Dropping an [`OwnedFd`] does the same; this spells it out at call sites
/// that want the release to be visible.
pub fn close_file(fd: OwnedFd) {
    let raw = fd.into_raw_fd();
    // SAFETY: `into_raw_fd` released ownership, so this is the only close.
    if unsafe { libc::close(raw) } == -1 {
        debug!(
            "Ignoring close error on fd {}: {}",
            raw,
            io::Error::last_os_error()
        );
    }
}

/// Metadata of the file behind `fd`
#[allow(clippy::useless_conversion)]
pub fn file_status<Fd: AsFd>(fd: Fd) -> Result<FileStatus> {
    let mut stat = MaybeUninit::<libc::stat>::uninit();
    // SAFETY: `stat` points to writable storage of the right type.
    if unsafe { libc::fstat(fd.as_fd().as_raw_fd(), stat.as_mut_ptr()) } == -1 {
        return Err(Error::last_os_error(Operation::Stat));
    }
    // SAFETY: `fstat` succeeded and filled the structure.
    let stat = unsafe { stat.assume_init() };

    Ok(FileStatus {
        mode: u32::from(stat.st_mode),
        size: u64::try_from(stat.st_size).unwrap_or(0),
    })
}

/// Permission bits of the file behind `fd`
pub fn file_mode<Fd: AsFd>(fd: Fd) -> Result<u32> {
    file_status(fd).map(|status| status.permissions())
}

/// Resize the file behind `fd` to exactly `length` bytes
pub(crate) fn truncate<Fd: AsFd>(fd: Fd, length: u64) -> Result<()> {
    let raw = fd.as_fd().as_raw_fd();
    let length = libc::off_t::try_from(length).map_err(|_| {
        Error::os(
            Operation::Truncate,
            io::Error::from_raw_os_error(libc::EFBIG),
        )
    })?;
    // SAFETY: plain syscall on a descriptor we borrow for the duration.
    retry_on_interrupt(|| unsafe { libc::ftruncate(raw, length) })
        .map_err(|e| Error::os(Operation::Truncate, e))?;
    Ok(())
}

/// Size of a memory page in bytes
pub fn page_size() -> usize {
    // SAFETY: `sysconf` has no memory-safety preconditions.
    let rc = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if rc <= 0 {
        warn!(
            "Unable to query the page size, assuming {} bytes",
            BufferSize::FALLBACK_PAGE
        );
        return BufferSize::FALLBACK_PAGE;
    }
    rc as usize
}

/// One memory page, the default chunk size of the read/write pipeline
pub fn page_buffer_size() -> BufferSize {
    BufferSize::new(page_size()).unwrap_or_default()
}
