//! Copy a file with writing out a mapping of the source

use copyperf_cli::args::MmapWriteCli;
use copyperf_cli::run_copy_tool;
use std::process::ExitCode;

fn main() -> ExitCode {
    run_copy_tool::<MmapWriteCli>(std::env::args_os().collect())
}
