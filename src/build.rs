// Copyright 2024 Martin Pool

//! Compile a (mutant, test) pair into an executable with an external
//! C/C++ toolchain.

use camino::Utf8Path;
use tracing::{debug, warn};

use crate::log_file::LogFile;
use crate::options::Options;
use crate::process::{self, ProcessStatus};
use crate::Result;

/// Compile `sources` into the executable at `output`.
///
/// The command line is `<compiler> [flags...] <sources...> -o <output>`.
/// The compiler's output goes to the scenario log; a failed or timed-out
/// build is reported in the return status, not as an error.
pub fn build_sources(
    sources: &[&Utf8Path],
    output: &Utf8Path,
    options: &Options,
    log_file: &mut LogFile,
) -> Result<ProcessStatus> {
    let mut argv: Vec<String> = Vec::with_capacity(sources.len() + options.build_flags.len() + 3);
    argv.push(options.compiler.clone());
    argv.extend(options.build_flags.iter().cloned());
    argv.extend(sources.iter().map(|path| path.to_string()));
    argv.push("-o".to_owned());
    argv.push(output.to_string());
    debug!(?argv, "build");
    let status = process::run_command(&argv, options.timeout, log_file)?;
    match status {
        ProcessStatus::Failure | ProcessStatus::Timeout => {
            warn!(
                "build failed for {output}; compiler output in {}",
                log_file.path()
            );
        }
        ProcessStatus::Success | ProcessStatus::Interrupted => {}
    }
    Ok(status)
}
