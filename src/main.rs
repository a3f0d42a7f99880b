// Copyright 2024 Martin Pool

//! `cc-mutants`: inject small bugs into C/C++ sources and check that the
//! matching unit tests catch them.

mod attrib;
mod build;
mod collect;
mod config;
mod console;
mod exit_code;
mod interrupt;
mod lab;
mod log_file;
mod matching;
mod mutate;
mod options;
mod outcome;
mod output;
mod process;
mod run;
mod scanner;
mod source;

use std::io;
use std::process::exit;
use std::time::Duration;

pub use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

use crate::config::Config;
use crate::options::Options;
use crate::output::OutputDir;

/// Mutation testing for C/C++ unit tests.
///
/// Sources are paired with tests by file name: a test file covers a source
/// when its name contains the source's name, and covers a function when it
/// also contains the function's name.
#[derive(Debug, Parser)]
#[command(name = "cc-mutants", version, about)]
pub struct Args {
    /// C/C++ source files or directories to mutate.
    #[arg(long, required = true, num_args = 1.., value_name = "PATH")]
    source: Vec<Utf8PathBuf>,

    /// C/C++ test file, or directory of test files.
    #[arg(long, value_name = "PATH", required_unless_present = "list")]
    test: Option<Utf8PathBuf>,

    /// Base directory for mutant sources and binaries; a `mutants_output`
    /// subdirectory is created inside it.
    #[arg(long = "mut", value_name = "PATH")]
    mut_dir: Option<Utf8PathBuf>,

    /// Just list the mutants that would be tested, without building or
    /// running anything.
    #[arg(long)]
    list: bool,

    /// With --list, emit JSON.
    #[arg(long)]
    json: bool,

    /// With --list, show the mutation diffs.
    #[arg(long)]
    diff: bool,

    /// Compiler used to build each (mutant, test) pair.
    #[arg(long, value_name = "CMD")]
    compiler: Option<String>,

    /// Extra compiler flag, passed before the sources; may be repeated.
    #[arg(long = "cflag", value_name = "FLAG", allow_hyphen_values = true)]
    build_flags: Vec<String>,

    /// Maximum time for each compile or test run, e.g. "10s".
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Config file; defaults to `cc-mutants.toml` in the working directory
    /// if that exists.
    #[arg(long, value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    /// Console log level: trace, debug, info, warn, error.
    #[arg(long = "level", short = 'L', default_value = "info", value_name = "LEVEL")]
    level: tracing::Level,
}

fn main() {
    let args = Args::parse();
    interrupt::install_handler();
    match run(&args) {
        Ok(code) => exit(code),
        Err(err) => {
            console::print_error(&format!("{err:#}"));
            exit(exit_code::SOFTWARE);
        }
    }
}

fn run(args: &Args) -> Result<i32> {
    let config = match &args.config {
        Some(path) => Config::read_file(path)?,
        None => Config::read_default()?,
    };
    let options = Options::new(args, &config)?;

    if args.list {
        init_logging(args.level, None);
        if options.emit_json && options.emit_diffs {
            console::print_error("--list --diff --json is not supported");
            return Ok(exit_code::USAGE);
        }
        let sources = collect::collect_source_files(&args.source)?;
        if sources.is_empty() {
            console::print_error(&format!(
                "no C/C++ source files found in {:?}",
                args.source
            ));
            return Ok(exit_code::USAGE);
        }
        let mutants = lab::discover_mutants(&sources)?;
        console::list_mutants(io::stdout().lock(), &mutants, &options)?;
        return Ok(exit_code::SUCCESS);
    }

    let mut_base = args.mut_dir.clone().unwrap_or_else(|| Utf8PathBuf::from("."));
    let output_dir = OutputDir::new(&mut_base)?;
    let _log_guard = init_logging(args.level, Some(output_dir.log_dir()));

    let sources = collect::collect_source_files(&args.source)?;
    if sources.is_empty() {
        console::print_error(&format!(
            "no C/C++ source files found in {:?}",
            args.source
        ));
        return Ok(exit_code::USAGE);
    }
    let test_arg = args.test.clone().expect("clap requires --test unless --list");
    let tests = collect::collect_source_files(std::slice::from_ref(&test_arg))?;
    if tests.is_empty() {
        console::print_error(&format!("no C/C++ test files found in {test_arg:?}"));
        return Ok(exit_code::USAGE);
    }
    info!(
        "found {} source file(s) and {} test file(s)",
        sources.len(),
        tests.len()
    );

    let outcome = lab::test_mutants(&sources, &tests, &output_dir, &options)?;
    console::print_report(&outcome)?;
    Ok(exit_code::SUCCESS)
}

/// Set up a stderr log layer at the chosen level and, when an output
/// directory exists, a debug-level file layer in its log directory.
fn init_logging(level: tracing::Level, log_dir: Option<&Utf8Path>) -> Option<WorkerGuard> {
    if let Some(log_dir) = log_dir {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(LevelFilter::from_level(level));
        let appender = tracing_appender::rolling::never(log_dir.as_std_path(), "debug.log");
        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_filter(LevelFilter::DEBUG);
        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .init();
        Some(guard)
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(LevelFilter::from_level(level));
        tracing_subscriber::registry().with(console_layer).init();
        None
    }
}
