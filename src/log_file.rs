// Copyright 2024 Martin Pool

//! Per-scenario log files holding compiler and test output, mixed with
//! commentary lines from cc-mutants.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

use crate::Result;

/// Marker prefix on commentary lines, to stand out from subprocess output.
const LOG_MARKER: &str = "***";

/// A log for one build-and-run scenario.
#[derive(Debug)]
pub struct LogFile {
    path: Utf8PathBuf,
    write_to: File,
}

impl LogFile {
    /// Create a fresh log named after the scenario, adding a numeric suffix
    /// if a log of that name already exists.
    pub fn create_in(log_dir: &Utf8Path, scenario_name: &str) -> Result<LogFile> {
        let basename = clean_filename(scenario_name);
        for i in 0..1000 {
            let name = if i == 0 {
                format!("{basename}.log")
            } else {
                format!("{basename}_{i:03}.log")
            };
            // Both this handle and the ones handed to subprocesses append,
            // so commentary and captured output interleave without
            // overwriting each other.
            let path = log_dir.join(name);
            match OpenOptions::new()
                .append(true)
                .read(true)
                .create_new(true)
                .open(&path)
            {
                Ok(write_to) => return Ok(LogFile { path, write_to }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(anyhow::Error::from(e)
                        .context(format!("create log file in {log_dir}")))
                }
            }
        }
        unreachable!("couldn't create any log in {log_dir:?} for {scenario_name:?}");
    }

    /// Write a marked commentary line.
    pub fn message(&mut self, message: &str) -> Result<()> {
        writeln!(self.write_to, "{LOG_MARKER} {message}")
            .with_context(|| format!("write message to {}", self.path))
    }

    /// Reopen the log so a subprocess can append its output.
    pub fn open_append(&self) -> Result<File> {
        OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {} for append", self.path))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

fn clean_filename(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ' ' | ':' | '<' | '>' | '?' | '*' | '|' | '"' => '_',
            c => c,
        })
        .collect()
}
