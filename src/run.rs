// Copyright 2024 Martin Pool

//! Execute a compiled test binary and classify its exit.

use camino::Utf8Path;
use tracing::warn;

use crate::log_file::LogFile;
use crate::options::Options;
use crate::process::{self, ProcessStatus};
use crate::Result;

/// Run the binary at `binary` and report how it exited.
///
/// Exit zero is a pass; a non-zero exit, a timeout, or a process that can't
/// be started at all are failures. Output goes to the scenario log.
pub fn run_test_binary(
    binary: &Utf8Path,
    options: &Options,
    log_file: &mut LogFile,
) -> Result<ProcessStatus> {
    let argv = [binary.to_string()];
    match process::run_command(&argv, options.timeout, log_file) {
        Ok(status) => Ok(status),
        Err(err) => {
            warn!("failed to execute {binary}: {err}");
            Ok(ProcessStatus::Failure)
        }
    }
}
