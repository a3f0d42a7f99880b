// Copyright 2024 Martin Pool

//! Print listings, progress lines, and the final report on the terminal.

use std::io::{self, Write};
use std::time::Duration;

use camino::Utf8PathBuf;
use console::style;

use crate::mutate::Mutant;
use crate::options::Options;
use crate::outcome::{LabOutcome, Verdict};
use crate::Result;

/// List mutants as text or JSON, optionally with diffs.
pub fn list_mutants<W: Write>(mut out: W, mutants: &[Mutant], options: &Options) -> Result<()> {
    if options.emit_json {
        let mut list: Vec<serde_json::Value> = Vec::new();
        for mutant in mutants {
            let mut obj = serde_json::to_value(mutant)?;
            if options.emit_diffs {
                obj.as_object_mut()
                    .expect("mutant serializes to an object")
                    .insert("diff".to_owned(), serde_json::json!(mutant.diff()?));
            }
            list.push(obj);
        }
        serde_json::to_writer_pretty(&mut out, &list)?;
        writeln!(out)?;
    } else {
        for mutant in mutants {
            writeln!(out, "{mutant}")?;
            if options.emit_diffs {
                writeln!(out, "{}", mutant.diff()?)?;
            }
        }
    }
    Ok(())
}

/// One progress line per tested mutant.
pub fn print_mutant_outcome(
    mutant: &Mutant,
    verdict: Verdict,
    killed_by: Option<&Utf8PathBuf>,
    elapsed: Duration,
) {
    let styled_verdict = match verdict {
        Verdict::Killed => style("caught").green().to_string(),
        Verdict::Survived => style("NOT CAUGHT").red().bold().to_string(),
    };
    let killer = killed_by
        .and_then(|path| path.file_name())
        .map(|name| format!(" by {name}"))
        .unwrap_or_default();
    println!(
        "{} ... {styled_verdict}{killer} in {:.1}s",
        mutant.name(),
        elapsed.as_secs_f64()
    );
}

/// Write the summary table and, when there are any recorded attempts, the
/// per-attempt detail table.
pub fn write_report<W: Write>(mut out: W, outcome: &LabOutcome) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Mutation Testing Report")?;
    writeln!(out, "+----------------+---------+")?;
    writeln!(out, "| Result         | Count   |")?;
    writeln!(out, "+----------------+---------+")?;
    writeln!(out, "| Total mutants  | {:<7} |", outcome.total)?;
    writeln!(out, "| Killed         | {:<7} |", outcome.killed)?;
    writeln!(out, "| Survived       | {:<7} |", outcome.survived)?;
    writeln!(out, "+----------------+---------+")?;
    match outcome.mutation_score() {
        Some(score) => writeln!(out, "| Mutation Score | {score:6.1}% |")?,
        None => writeln!(out, "| Mutation Score |   N/A   |")?,
    }
    writeln!(out, "+----------------+---------+")?;
    if outcome.attempts.is_empty() {
        return Ok(());
    }
    let rule = "+-----+-------------------------+------------------------------+------------------------------+----------+";
    writeln!(out)?;
    writeln!(out, "Detailed Mutant/Test Results:")?;
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "| No. | Source File             | Mutant File                  | Test File                    | Result   |"
    )?;
    writeln!(out, "{rule}")?;
    for (number, attempt) in outcome.attempts.iter().enumerate() {
        writeln!(
            out,
            "| {:<3} | {:<23} | {:<28} | {:<28} | {:<8} |",
            number + 1,
            file_name(&attempt.source_path),
            file_name(&attempt.mutant_path),
            file_name(&attempt.test_path),
            attempt.verdict,
        )?;
    }
    writeln!(out, "{rule}")?;
    Ok(())
}

pub fn print_report(outcome: &LabOutcome) -> io::Result<()> {
    write_report(io::stdout().lock(), outcome)
}

pub fn print_error(msg: &str) {
    eprintln!("{}: {msg}", style("error").bold().red());
}

fn file_name(path: &Utf8PathBuf) -> &str {
    path.file_name().unwrap_or(path.as_str())
}
