// Copyright 2024 Martin Pool

//! The `mutants_output/` directory holding mutant sources, compiled
//! binaries, and per-scenario logs.
//!
//! Everything written here persists after the run so that mutants can be
//! inspected afterwards; the caller owns deletion.

use std::fs::create_dir_all;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

use crate::log_file::LogFile;
use crate::Result;

pub const OUTPUT_DIR_NAME: &str = "mutants_output";

/// A run-scoped output directory, created inside the `--mut` base.
#[derive(Debug)]
pub struct OutputDir {
    path: Utf8PathBuf,
    log_dir: Utf8PathBuf,
}

impl OutputDir {
    pub fn new(base: &Utf8Path) -> Result<OutputDir> {
        let path = base.join(OUTPUT_DIR_NAME);
        create_dir_all(&path).with_context(|| format!("create output directory {path}"))?;
        let log_dir = path.join("log");
        create_dir_all(&log_dir).with_context(|| format!("create log directory {log_dir}"))?;
        Ok(OutputDir { path, log_dir })
    }

    /// Where a mutant source artifact with this file name is written.
    pub fn mutant_path(&self, file_name: &str) -> Utf8PathBuf {
        self.path.join(file_name)
    }

    /// Where the binary for a mutant is compiled to.
    pub fn binary_path(&self, mutant_name: &str) -> Utf8PathBuf {
        self.path.join(mutant_name)
    }

    pub fn create_log(&self, scenario_name: &str) -> Result<LogFile> {
        LogFile::create_in(&self.log_dir, scenario_name)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn log_dir(&self) -> &Utf8Path {
        &self.log_dir
    }
}
