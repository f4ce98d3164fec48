//! Error types and handling for copyperf
//!
//! Every fallible operation in the workspace reports an [`Error`]. OS-level
//! failures keep the [`std::io::Error`] they came from together with the
//! [`Operation`] that was being attempted and, when there is one, the path
//! involved.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The system-level operation that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Opening or creating a file
    Open,
    /// Reading from a descriptor
    Read,
    /// Writing to a descriptor
    Write,
    /// Querying file metadata
    Stat,
    /// Resizing a file
    Truncate,
    /// Creating a memory mapping
    Map,
    /// Flushing a memory mapping to its file
    Sync,
    /// Removing a memory mapping
    Unmap,
    /// Whole-file kernel copy
    Copy,
    /// Starting a child process
    Exec,
    /// Waiting for a child process
    Wait,
    /// Querying child resource usage
    ResourceUsage,
}

impl Operation {
    /// Short lowercase name used in error messages
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Read => "read",
            Self::Write => "write",
            Self::Stat => "stat",
            Self::Truncate => "truncate",
            Self::Map => "mmap",
            Self::Sync => "msync",
            Self::Unmap => "munmap",
            Self::Copy => "copy",
            Self::Exec => "exec",
            Self::Wait => "wait",
            Self::ResourceUsage => "rusage",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for copyperf operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A system call failed
    #[error("{operation} error{}: {}", describe_path(.path), describe_source(.source))]
    Os {
        /// Operation that failed
        operation: Operation,
        /// File the operation was acting on, if any
        path: Option<PathBuf>,
        /// Error reported by the operating system
        source: io::Error,
    },

    /// A caller-supplied value was rejected before any I/O happened
    #[error("{message}")]
    InvalidArgument {
        /// Description of the rejected value
        message: String,
    },
}

fn describe_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" on \"{}\"", path.display()),
        None => String::new(),
    }
}

// `io::Error` renders OS errors as "<strerror> (os error N)"; keep only the strerror text.
fn describe_source(source: &io::Error) -> String {
    let message = source.to_string();
    match source.raw_os_error() {
        Some(code) => message
            .strip_suffix(&format!(" (os error {})", code))
            .map_or_else(|| message.clone(), str::to_owned),
        None => message,
    }
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operating system errors
    Os,
    /// Usage and validation errors
    InvalidArgument,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Os { .. } => ErrorKind::Os,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// Operation that failed, for OS errors
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Os { operation, .. } => Some(*operation),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Path the failing operation was acting on
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Os { path, .. } => path.as_deref(),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// OS error number, when the error came from a system call
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Os { source, .. } => source.raw_os_error(),
            Self::InvalidArgument { .. } => None,
        }
    }

    /// Whether the underlying system call was interrupted by a signal
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Os { source, .. } if source.kind() == io::ErrorKind::Interrupted)
    }

    /// Create an OS error without path context
    pub fn os(operation: Operation, source: io::Error) -> Self {
        Self::Os {
            operation,
            path: None,
            source,
        }
    }

    /// Create an OS error for an operation on `path`
    pub fn os_at(operation: Operation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Os {
            operation,
            path: Some(path.into()),
            source,
        }
    }

    /// Capture `errno` right after a failed system call
    pub fn last_os_error(operation: Operation) -> Self {
        Self::os(operation, io::Error::last_os_error())
    }

    /// Attach `path` to an OS error that does not carry one yet
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::Os {
                operation,
                path: None,
                source,
            } => Self::Os {
                operation,
                path: Some(path.into()),
                source,
            },
            other => other,
        }
    }

    /// Create a new invalid-argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
