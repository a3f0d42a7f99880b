// Copyright 2024 Martin Pool

//! Access to C/C++ source files.

use std::sync::Arc;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

use crate::Result;

/// A source file's path plus its full text, read once at construction.
///
/// Code is normalized to Unix line endings as it's read in, so that byte
/// columns within a line are stable on every platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: Utf8PathBuf,
    pub code: Arc<String>,
}

impl SourceFile {
    pub fn read(path: &Utf8Path) -> Result<SourceFile> {
        let code = std::fs::read_to_string(path)
            .with_context(|| format!("read source file {path}"))?
            .replace("\r\n", "\n");
        Ok(SourceFile {
            path: path.to_owned(),
            code: Arc::new(code),
        })
    }

    /// The file name without its extension, used for test matching and
    /// mutant naming.
    pub fn stem(&self) -> &str {
        self.path.file_stem().unwrap_or_default()
    }

    /// The source extension, carried over onto mutant artifacts.
    pub fn extension(&self) -> &str {
        self.path.extension().unwrap_or("c")
    }

    pub fn lines(&self) -> Vec<&str> {
        self.code.lines().collect()
    }
}
