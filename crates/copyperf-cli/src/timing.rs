//! Process timing for `jsontime`
//!
//! The child inherits our standard streams and is waited for with the
//! standard library, which retries `EINTR`. CPU time and peak memory come
//! from `getrusage(RUSAGE_CHILDREN)`, so they cover every child this
//! process has reaped, which for `jsontime` is exactly one.

use copyperf_types::{Error, Operation, Result};
use nix::sys::resource::{getrusage, UsageWho};
use nix::sys::time::TimeVal;
use serde::Serialize;
use std::ffi::OsString;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};
use std::time::Instant;
use tracing::{debug, warn};

/// One timed run, serialized as the `jsontime` output line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingReport {
    /// Exit code, or the negated signal number if the child was killed
    pub status: i32,
    /// The command line that was run
    pub command: Vec<String>,
    /// User CPU time in microseconds
    pub cpu_user_micros: i64,
    /// System CPU time in microseconds
    pub cpu_system_micros: i64,
    /// Elapsed wall-clock time in microseconds
    pub wall_micros: u64,
    /// Peak resident set size in kilobytes
    pub max_resident_size_kb: i64,
}

impl TimingReport {
    /// Render as a single JSON line
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn micros(time: TimeVal) -> i64 {
    i64::from(time.tv_sec()) * 1_000_000 + i64::from(time.tv_usec())
}

/// Exit code, or minus the terminating signal
pub fn exit_status_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => -signal,
        (None, None) => {
            warn!("Child ended with neither an exit code nor a signal: {:?}", status);
            -1
        }
    }
}

// Linux reports ru_maxrss in kilobytes, macOS in bytes.
#[cfg(target_os = "macos")]
fn max_rss_kb(max_rss: i64) -> i64 {
    max_rss / 1024
}

#[cfg(not(target_os = "macos"))]
fn max_rss_kb(max_rss: i64) -> i64 {
    max_rss
}

/// Run `command` (program name first, looked up in `PATH`) to completion and measure it
pub fn time_command(command: &[OsString]) -> Result<TimingReport> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| Error::invalid_argument("no command to run"))?;

    debug!("Running {:?}", command);
    let start = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .spawn()
        .map_err(|e| Error::os_at(Operation::Exec, program, e))?;
    let status = child.wait().map_err(|e| Error::os(Operation::Wait, e))?;
    let wall = start.elapsed();

    let usage = getrusage(UsageWho::RUSAGE_CHILDREN)
        .map_err(|errno| Error::os(Operation::ResourceUsage, io::Error::from(errno)))?;

    let report = TimingReport {
        status: exit_status_code(status),
        command: command
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect(),
        cpu_user_micros: micros(usage.user_time()),
        cpu_system_micros: micros(usage.system_time()),
        wall_micros: u64::try_from(wall.as_micros()).unwrap_or(u64::MAX),
        max_resident_size_kb: max_rss_kb(i64::from(usage.max_rss())),
    };
    debug!("Child finished: {:?}", report);
    Ok(report)
}
