//! Command-line surfaces of the five front ends

use clap::{Args, Parser};
use copyperf_types::{BufferSize, CopyStrategy};
use std::ffi::OsString;
use std::path::PathBuf;

/// The two positional paths every copy tool takes
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct FileArgs {
    /// File to copy from
    #[arg(value_name = "source file")]
    pub source: PathBuf,

    /// File to create or overwrite
    #[arg(value_name = "destination file")]
    pub destination: PathBuf,
}

/// A parsed copy-tool command line, bound to the strategy it runs
pub trait CopyCommand: Parser {
    /// Strategy this tool measures
    const STRATEGY: CopyStrategy;

    /// Source and destination paths
    fn files(&self) -> &FileArgs;

    /// Requested chunk size, for tools that accept `--buffer`
    fn buffer_size(&self) -> Option<BufferSize> {
        None
    }
}

/// Copy a file with the platform's whole-file kernel copy
#[derive(Parser, Debug)]
#[command(
    name = "copy",
    about = "Copy a file with one kernel-level whole-file copy (sendfile on Linux, copyfile on macOS)"
)]
pub struct CopyCli {
    #[command(flatten)]
    pub files: FileArgs,
}

impl CopyCommand for CopyCli {
    const STRATEGY: CopyStrategy = CopyStrategy::Copy;

    fn files(&self) -> &FileArgs {
        &self.files
    }
}

/// Copy a file through a user-space buffer
#[derive(Parser, Debug)]
#[command(
    name = "read-write",
    about = "Copy a file with a read/write loop through a user-space buffer"
)]
pub struct ReadWriteCli {
    /// Size in bytes of each read and write [default: one memory page]
    #[arg(long, value_name = "BUFSIZE", allow_negative_numbers = true)]
    pub buffer: Option<BufferSize>,

    #[command(flatten)]
    pub files: FileArgs,
}

impl CopyCommand for ReadWriteCli {
    const STRATEGY: CopyStrategy = CopyStrategy::ReadWrite;

    fn files(&self) -> &FileArgs {
        &self.files
    }

    fn buffer_size(&self) -> Option<BufferSize> {
        self.buffer
    }
}

/// Copy a file by reading it into a mapping of the destination
#[derive(Parser, Debug)]
#[command(
    name = "read-mmap",
    about = "Copy a file by reading it straight into a writable memory mapping of the destination"
)]
pub struct ReadMmapCli {
    #[command(flatten)]
    pub files: FileArgs,
}

impl CopyCommand for ReadMmapCli {
    const STRATEGY: CopyStrategy = CopyStrategy::ReadMmap;

    fn files(&self) -> &FileArgs {
        &self.files
    }
}

/// Copy a file by writing out a mapping of the source
#[derive(Parser, Debug)]
#[command(
    name = "mmap-write",
    about = "Copy a file by memory-mapping the source and writing the mapping to the destination"
)]
pub struct MmapWriteCli {
    #[command(flatten)]
    pub files: FileArgs,
}

impl CopyCommand for MmapWriteCli {
    const STRATEGY: CopyStrategy = CopyStrategy::MmapWrite;

    fn files(&self) -> &FileArgs {
        &self.files
    }
}

/// Run a command and report its resource usage as JSON
#[derive(Parser, Debug)]
#[command(
    name = "jsontime",
    about = "Run COMMAND and print its exit status, CPU time, wall time and peak memory as one JSON line"
)]
pub struct JsonTimeCli {
    /// Program to run (looked up in PATH), followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}
