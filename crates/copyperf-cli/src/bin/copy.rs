//! Copy a file with one kernel-level whole-file copy

use copyperf_cli::args::CopyCli;
use copyperf_cli::run_copy_tool;
use std::process::ExitCode;

fn main() -> ExitCode {
    run_copy_tool::<CopyCli>(std::env::args_os().collect())
}
