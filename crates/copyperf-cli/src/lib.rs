//! Command-line front ends for copyperf
//!
//! Four binaries (`copy`, `read-write`, `read-mmap`, `mmap-write`) each run
//! one copy strategy from [`copyperf_posix::strategy`] and share everything
//! else: argument parsing, help handling, logging, and error reporting.
//! The fifth, `jsontime`, runs a command and prints its resource usage as
//! JSON so the others can be compared.
//!
//! Exit codes are 0 for success or help, and 1 for any usage or runtime error.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod args;
pub mod logging;
pub mod parse;
pub mod timing;

use crate::args::{CopyCommand, JsonTimeCli};
use crate::parse::{parse_args, ArgumentLayout, Parsed};
use copyperf_posix::{page_buffer_size, strategy};
use copyperf_types::CopyReport;
use std::ffi::OsString;
use std::process::ExitCode;
use tracing::warn;

fn start_logging() {
    if let Err(e) = logging::init_logging() {
        eprintln!("warning: logging disabled: {}", e);
    }
}

/// Run the strategy bound to `C` on already-parsed arguments
pub fn execute_copy<C: CopyCommand>(cli: &C) -> anyhow::Result<CopyReport> {
    let files = cli.files();
    let buffer_size = cli.buffer_size().unwrap_or_else(page_buffer_size);
    let report = strategy::run(C::STRATEGY, &files.source, &files.destination, buffer_size)?;
    Ok(report)
}

/// Entry point of the copy tools: parse `args` (program name first), copy, report
pub fn run_copy_tool<C: CopyCommand>(args: Vec<OsString>) -> ExitCode {
    let cli = match parse_args::<C>(args, ArgumentLayout::Files) {
        Parsed::Run(cli) => cli,
        Parsed::Help(text) => {
            println!("{}", text.trim_end());
            return ExitCode::SUCCESS;
        }
        Parsed::Usage(text) => {
            eprintln!("{}", text.trim_end());
            return ExitCode::FAILURE;
        }
    };

    start_logging();
    match execute_copy(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Entry point of `jsontime`: run the command, print one JSON line
pub fn run_jsontime(args: Vec<OsString>) -> ExitCode {
    let cli = match parse_args::<JsonTimeCli>(args, ArgumentLayout::Command) {
        Parsed::Run(cli) => cli,
        Parsed::Help(text) => {
            println!("{}", text.trim_end());
            return ExitCode::SUCCESS;
        }
        Parsed::Usage(text) => {
            eprintln!("{}", text.trim_end());
            return ExitCode::FAILURE;
        }
    };

    start_logging();
    let report = match timing::time_command(&cli.command) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match report.to_json() {
        Ok(line) => {
            println!("{}", line);
            ExitCode::SUCCESS
        }
        Err(e) => {
            warn!("Could not serialize timing report: {}", e);
            eprintln!("json error: {}", e);
            ExitCode::FAILURE
        }
    }
}
