// Copyright 2024 Martin Pool

//! `cc-mutants.toml` configuration file.
//!
//! The config file is read before command line arguments are merged in;
//! arguments win over config values.

use std::fs::read_to_string;

use anyhow::Context;
use camino::Utf8Path;
use serde::Deserialize;

use crate::Result;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "cc-mutants.toml";

/// Configuration read from a config file.
///
/// This is similar to [crate::options::Options], into which it is merged,
/// but separate because it can be deserialized.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Compiler command used to build each (mutant, test) pair.
    pub compiler: Option<String>,
    /// Extra flags passed to the compiler before the sources.
    pub build_flags: Vec<String>,
    /// Wall-clock bound per build or test run, as a humantime string like
    /// "10s".
    pub timeout: Option<String>,
}

impl Config {
    pub fn read_file(path: &Utf8Path) -> Result<Config> {
        let toml = read_to_string(path).with_context(|| format!("read config {path:?}"))?;
        toml::from_str(&toml).with_context(|| format!("parse toml from {path:?}"))
    }

    /// Read [CONFIG_FILE_NAME] from the working directory, or return an
    /// empty Config if there is no such file.
    pub fn read_default() -> Result<Config> {
        let path = Utf8Path::new(CONFIG_FILE_NAME);
        if path.exists() {
            Config::read_file(path)
        } else {
            Ok(Config::default())
        }
    }
}
