// Copyright 2024 Martin Pool

//! Global in-process options for a run, merged from command line arguments
//! and the config file.

use std::time::Duration;

use anyhow::Context;

use crate::config::Config;
use crate::Args;
use crate::Result;

/// The compiler used when neither the command line nor config names one.
pub const DEFAULT_COMPILER: &str = "gcc";

#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Compiler command for each (mutant, test) pair.
    pub compiler: String,

    /// Extra flags passed before the source paths.
    pub build_flags: Vec<String>,

    /// Wall-clock bound per build or test run; None means unbounded.
    pub timeout: Option<Duration>,

    /// With --list, emit JSON instead of text.
    pub emit_json: bool,

    /// With --list, show a unified diff of each mutant.
    pub emit_diffs: bool,
}

impl Options {
    /// Build options from command-line args, with the config file filling in
    /// anything the command line left unset.
    pub fn new(args: &Args, config: &Config) -> Result<Options> {
        let config_timeout = config
            .timeout
            .as_deref()
            .map(humantime::parse_duration)
            .transpose()
            .context("parse timeout from config")?;
        Ok(Options {
            compiler: args
                .compiler
                .clone()
                .or_else(|| config.compiler.clone())
                .unwrap_or_else(|| DEFAULT_COMPILER.to_owned()),
            build_flags: if args.build_flags.is_empty() {
                config.build_flags.clone()
            } else {
                args.build_flags.clone()
            },
            timeout: args.timeout.or(config_timeout),
            emit_json: args.json,
            emit_diffs: args.diff,
        })
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["cc-mutants"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults_without_config() {
        let args = args(&["--source", "src", "--test", "tests"]);
        let options = Options::new(&args, &Config::default()).unwrap();
        assert_eq!(options.compiler, "gcc");
        assert_eq!(options.build_flags, Vec::<String>::new());
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn config_fills_unset_values() {
        let args = args(&["--source", "src", "--test", "tests"]);
        let config = Config {
            compiler: Some("clang".to_owned()),
            build_flags: vec!["-Wall".to_owned()],
            timeout: Some("5s".to_owned()),
        };
        let options = Options::new(&args, &config).unwrap();
        assert_eq!(options.compiler, "clang");
        assert_eq!(options.build_flags, ["-Wall"]);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn command_line_wins_over_config() {
        let args = args(&[
            "--source", "src", "--test", "tests", "--compiler", "g++", "--cflag", "-O2",
            "--timeout", "2s",
        ]);
        let config = Config {
            compiler: Some("clang".to_owned()),
            build_flags: vec!["-Wall".to_owned()],
            timeout: Some("5s".to_owned()),
        };
        let options = Options::new(&args, &config).unwrap();
        assert_eq!(options.compiler, "g++");
        assert_eq!(options.build_flags, ["-O2"]);
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn bad_config_timeout_is_an_error() {
        let args = args(&["--source", "src", "--test", "tests"]);
        let config = Config {
            timeout: Some("not-a-duration".to_owned()),
            ..Config::default()
        };
        assert!(Options::new(&args, &config).is_err());
    }
}
