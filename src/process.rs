// Copyright 2024 Martin Pool

//! Run one subprocess: spawn it with output redirected into a scenario log,
//! poll it against an optional wall-clock bound and the interrupt flag, and
//! terminate it if either fires.
//!
//! This layer knows nothing about compilers or test binaries.
//!
//! On Unix the child runs as its own process group, so that any grandchild
//! processes are also signalled when it's terminated.

use std::time::{Duration, Instant};

use subprocess::{Popen, PopenConfig, Redirection};
use tracing::{debug, warn};

use crate::interrupt::is_interrupted;
use crate::log_file::LogFile;
use crate::Result;

/// How frequently to check whether the child finished.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What became of one subprocess.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProcessStatus {
    /// Exited with status zero.
    Success,
    /// Exited non-zero.
    Failure,
    /// Ran past the wall-clock bound and was terminated.
    Timeout,
    /// The user interrupted the run; the child was terminated.
    Interrupted,
}

impl ProcessStatus {
    pub fn success(&self) -> bool {
        matches!(self, ProcessStatus::Success)
    }
}

/// Run `argv` to completion, appending its merged stdout and stderr to
/// `log_file`.
pub fn run_command(
    argv: &[String],
    timeout: Option<Duration>,
    log_file: &mut LogFile,
) -> Result<ProcessStatus> {
    let start = Instant::now();
    let timeout = timeout.unwrap_or(Duration::MAX);
    log_file.message(&format!("run {}", argv.join(" ")))?;
    debug!(?argv, "spawn");
    let mut child = Popen::create(
        argv,
        PopenConfig {
            stdin: Redirection::None,
            stdout: Redirection::File(log_file.open_append()?),
            stderr: Redirection::Merge,
            ..setpgid_on_unix()
        },
    )
    .map_err(|err| anyhow::anyhow!("failed to spawn {}: {err}", argv.join(" ")))?;
    let exit_status = loop {
        if let Some(status) = child.wait_timeout(WAIT_POLL_INTERVAL)? {
            break status;
        }
        if start.elapsed() > timeout {
            log_file.message(&format!(
                "timeout after {:.1}s, terminating child",
                start.elapsed().as_secs_f32()
            ))?;
            terminate_child(&mut child, log_file)?;
            return Ok(ProcessStatus::Timeout);
        }
        if is_interrupted() {
            log_file.message("interrupted, terminating child")?;
            terminate_child(&mut child, log_file)?;
            return Ok(ProcessStatus::Interrupted);
        }
    };
    log_file.message(&format!(
        "result: {exit_status:?} in {:.3}s",
        start.elapsed().as_secs_f64()
    ))?;
    if exit_status.success() {
        Ok(ProcessStatus::Success)
    } else {
        Ok(ProcessStatus::Failure)
    }
}

#[cfg(unix)]
fn terminate_child(child: &mut Popen, log_file: &mut LogFile) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};

    if let Some(pid) = child.pid() {
        let pid = nix::unistd::Pid::from_raw(pid as i32);
        if let Err(errno) = killpg(pid, Signal::SIGTERM) {
            // ESRCH means we raced and it's already gone.
            if errno != Errno::ESRCH {
                let message = format!("failed to terminate child: {errno}");
                warn!("{message}");
                log_file.message(&message)?;
                return Err(anyhow::anyhow!(message));
            }
        }
    }
    child.wait()?;
    Ok(())
}

#[cfg(not(unix))]
fn terminate_child(child: &mut Popen, log_file: &mut LogFile) -> Result<()> {
    if let Err(e) = child.terminate() {
        // most likely we raced and it's already gone
        let message = format!("failed to terminate child: {e}");
        warn!("{message}");
        log_file.message(&message)?;
        return Err(anyhow::anyhow!(message));
    }
    child.wait()?;
    Ok(())
}

#[cfg(unix)]
fn setpgid_on_unix() -> PopenConfig {
    PopenConfig {
        setpgid: true,
        ..Default::default()
    }
}

#[cfg(not(unix))]
fn setpgid_on_unix() -> PopenConfig {
    Default::default()
}

#[cfg(test)]
mod test {
    use camino::Utf8PathBuf;

    use super::*;

    fn scratch_log() -> (tempfile::TempDir, LogFile) {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let log = LogFile::create_in(&dir, "scenario").unwrap();
        (tmp, log)
    }

    #[test]
    fn true_succeeds_and_false_fails() {
        let (_tmp, mut log) = scratch_log();
        let status = run_command(&["true".to_owned()], None, &mut log).unwrap();
        assert_eq!(status, ProcessStatus::Success);
        let status = run_command(&["false".to_owned()], None, &mut log).unwrap();
        assert_eq!(status, ProcessStatus::Failure);
    }

    #[test]
    fn child_output_is_captured_in_the_log() {
        let (_tmp, mut log) = scratch_log();
        let argv = ["echo".to_owned(), "compiled ok".to_owned()];
        run_command(&argv, None, &mut log).unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("*** run echo compiled ok"));
        assert!(content.contains("compiled ok\n"));
    }

    #[test]
    fn overlong_child_times_out() {
        let (_tmp, mut log) = scratch_log();
        let argv = ["sleep".to_owned(), "10".to_owned()];
        let status = run_command(&argv, Some(Duration::from_millis(200)), &mut log).unwrap();
        assert_eq!(status, ProcessStatus::Timeout);
    }

    #[test]
    fn unspawnable_command_is_an_error() {
        let (_tmp, mut log) = scratch_log();
        let argv = ["cc-mutants-no-such-binary".to_owned()];
        assert!(run_command(&argv, None, &mut log).is_err());
    }
}
