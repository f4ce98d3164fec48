//! Copy a file with a buffered read/write loop

use copyperf_cli::args::ReadWriteCli;
use copyperf_cli::run_copy_tool;
use std::process::ExitCode;

fn main() -> ExitCode {
    run_copy_tool::<ReadWriteCli>(std::env::args_os().collect())
}
