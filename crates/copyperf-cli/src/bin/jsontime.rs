//! Run a command and print its exit status and resource usage as JSON

use std::process::ExitCode;

fn main() -> ExitCode {
    copyperf_cli::run_jsontime(std::env::args_os().collect())
}
