//! Core types shared by the copy pipelines and their front ends

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// How bytes travel from the source file to the destination file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyStrategy {
    /// One kernel-level whole-file copy (`sendfile`, `copyfile`, or a portable loop)
    Copy,
    /// Buffered `read` into user memory, then `write`
    ReadWrite,
    /// `read` from the source straight into a writable mapping of the destination
    ReadMmap,
    /// Map the source read-only and `write` the mapping to the destination
    MmapWrite,
}

impl CopyStrategy {
    /// Every strategy, in the order the front ends are usually compared
    pub const ALL: [CopyStrategy; 4] = [
        CopyStrategy::Copy,
        CopyStrategy::ReadWrite,
        CopyStrategy::ReadMmap,
        CopyStrategy::MmapWrite,
    ];

    /// Name of the command-line program implementing this strategy
    pub fn program_name(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::ReadWrite => "read-write",
            Self::ReadMmap => "read-mmap",
            Self::MmapWrite => "mmap-write",
        }
    }

    /// Whether the strategy honours a caller-chosen buffer size
    pub fn uses_buffer(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

impl fmt::Display for CopyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program_name())
    }
}

impl FromStr for CopyStrategy {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.program_name() == name)
            .ok_or_else(|| Error::invalid_argument(format!("unknown copy strategy \"{}\"", name)))
    }
}

/// Metadata of an open file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStatus {
    /// Raw `st_mode`, including the file-type bits
    pub mode: u32,
    /// File size in bytes
    pub size: u64,
}

impl FileStatus {
    /// Permission bits only, suitable for creating a file
    pub fn permissions(&self) -> u32 {
        self.mode & 0o7777
    }
}

/// Outcome of one completed copy pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    /// Strategy that performed the copy
    pub strategy: CopyStrategy,
    /// Bytes that reached the destination
    pub bytes: u64,
}

impl CopyReport {
    /// Create a report
    pub fn new(strategy: CopyStrategy, bytes: u64) -> Self {
        Self { strategy, bytes }
    }
}
