//! Copy a file with reading into a mapping of the destination

use copyperf_cli::args::ReadMmapCli;
use copyperf_cli::run_copy_tool;
use std::process::ExitCode;

fn main() -> ExitCode {
    run_copy_tool::<ReadMmapCli>(std::env::args_os().collect())
}
