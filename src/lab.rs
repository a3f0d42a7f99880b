// Copyright 2024 Martin Pool

//! Drive the whole pipeline: discover mutants, write each one to disk,
//! build it against every matching test, run the tests, and tally verdicts.

use std::fs;
use std::time::Instant;

use camino::Utf8PathBuf;
use tracing::{debug, info, warn};

use crate::attrib::group_sites_by_function;
use crate::build::build_sources;
use crate::console;
use crate::interrupt::is_interrupted;
use crate::matching::{tests_matching_function, tests_matching_source};
use crate::mutate::Mutant;
use crate::options::Options;
use crate::outcome::{LabOutcome, TestAttempt, Verdict};
use crate::output::OutputDir;
use crate::process::ProcessStatus;
use crate::run::run_test_binary;
use crate::scanner::find_sites;
use crate::source::SourceFile;
use crate::Result;

/// Discover every mutant in the given sources, without running anything.
///
/// Sources that can't be read are skipped with a warning, in keeping with
/// the scanner's rule that bad input yields fewer mutants, not a failed run.
pub fn discover_mutants(source_paths: &[Utf8PathBuf]) -> Result<Vec<Mutant>> {
    let mut mutants = Vec::new();
    for source_path in source_paths {
        let source_file = match SourceFile::read(source_path) {
            Ok(source_file) => source_file,
            Err(err) => {
                warn!("{err:#}");
                continue;
            }
        };
        let sites = find_sites(&source_file.code);
        debug!(path = %source_path, sites = sites.len(), "scanned");
        let lines = source_file.lines();
        for (function, sites) in group_sites_by_function(&lines, sites) {
            for (index, site) in sites.into_iter().enumerate() {
                mutants.push(Mutant::new(source_file.clone(), function.clone(), index, site));
            }
        }
    }
    Ok(mutants)
}

/// Test every mutant of every source against its matching tests.
///
/// An interrupt stops the run between subprocess invocations; whatever was
/// accumulated by then is returned so it can still be reported.
pub fn test_mutants(
    source_paths: &[Utf8PathBuf],
    test_paths: &[Utf8PathBuf],
    output_dir: &OutputDir,
    options: &Options,
) -> Result<LabOutcome> {
    let mut lab_outcome = LabOutcome::default();
    'sources: for source_path in source_paths {
        let source_file = match SourceFile::read(source_path) {
            Ok(source_file) => source_file,
            Err(err) => {
                warn!("{err:#}");
                continue;
            }
        };
        let sites = find_sites(&source_file.code);
        if sites.is_empty() {
            info!("no mutation sites found in {source_path}");
            continue;
        }
        let source_tests = tests_matching_source(test_paths, source_file.stem());
        if source_tests.is_empty() {
            info!("no matching test files for {source_path}; skipping its mutants");
            continue;
        }
        let lines = source_file.lines();
        let groups = group_sites_by_function(&lines, sites);
        for (function, sites) in groups {
            let function_tests = tests_matching_function(&source_tests, &function);
            if function_tests.is_empty() {
                info!(
                    "no matching test files for function {function:?} in {source_path}; \
                     skipping its mutants"
                );
                continue;
            }
            for (index, site) in sites.into_iter().enumerate() {
                let mutant =
                    Mutant::new(source_file.clone(), function.clone(), index, site);
                match test_one_mutant(
                    &mutant,
                    &function_tests,
                    output_dir,
                    options,
                    &mut lab_outcome,
                )? {
                    Flow::Continue => {}
                    Flow::Interrupted => {
                        info!("interrupted; reporting partial results");
                        break 'sources;
                    }
                }
            }
        }
    }
    Ok(lab_outcome)
}

/// Whether the run goes on after one mutant.
enum Flow {
    Continue,
    Interrupted,
}

/// Write one mutant and run it against its tests until it is killed or the
/// tests are exhausted.
///
/// Internal failures (a desynchronized site, an unwritable artifact) abort
/// only this mutant, which then counts toward nothing.
fn test_one_mutant(
    mutant: &Mutant,
    tests: &[&Utf8PathBuf],
    output_dir: &OutputDir,
    options: &Options,
    lab_outcome: &mut LabOutcome,
) -> Result<Flow> {
    let start = Instant::now();
    let mutated_code = match mutant.mutated_code() {
        Ok(code) => code,
        Err(err) => {
            warn!("skipping {}: {err:#}", mutant.name());
            return Ok(Flow::Continue);
        }
    };
    let mutant_path = output_dir.mutant_path(&mutant.file_name());
    if let Err(err) = fs::write(&mutant_path, &mutated_code) {
        warn!("failed to write {mutant_path}: {err}; skipping this mutant");
        return Ok(Flow::Continue);
    }
    let binary_path = output_dir.binary_path(&mutant.name());
    let mut verdict = Verdict::Survived;
    let mut killed_by = None;
    for test_path in tests {
        let test_stem = test_path.file_stem().unwrap_or_default();
        let mut log_file =
            output_dir.create_log(&format!("{}_{}", mutant.name(), test_stem))?;
        log_file.message(&mutant.to_string())?;
        let build_status = build_sources(
            &[mutant_path.as_path(), test_path.as_path()],
            &binary_path,
            options,
            &mut log_file,
        )?;
        match build_status {
            ProcessStatus::Interrupted => return Ok(Flow::Interrupted),
            ProcessStatus::Failure | ProcessStatus::Timeout => {
                // A mutant the tests won't even compile against is caught.
                lab_outcome.record(attempt(mutant, &mutant_path, test_path, Verdict::Killed));
                verdict = Verdict::Killed;
                killed_by = Some(test_path);
                break;
            }
            ProcessStatus::Success => {}
        }
        if is_interrupted() {
            return Ok(Flow::Interrupted);
        }
        let run_status = run_test_binary(&binary_path, options, &mut log_file)?;
        match run_status {
            ProcessStatus::Interrupted => return Ok(Flow::Interrupted),
            ProcessStatus::Failure | ProcessStatus::Timeout => {
                lab_outcome.record(attempt(mutant, &mutant_path, test_path, Verdict::Killed));
                verdict = Verdict::Killed;
                killed_by = Some(test_path);
                break;
            }
            ProcessStatus::Success => {
                lab_outcome.record(attempt(mutant, &mutant_path, test_path, Verdict::Survived));
            }
        }
    }
    lab_outcome.count_mutant(verdict);
    console::print_mutant_outcome(mutant, verdict, killed_by.copied(), start.elapsed());
    Ok(Flow::Continue)
}

fn attempt(
    mutant: &Mutant,
    mutant_path: &Utf8PathBuf,
    test_path: &Utf8PathBuf,
    verdict: Verdict,
) -> TestAttempt {
    TestAttempt {
        source_path: mutant.source_file.path.clone(),
        mutant_path: mutant_path.clone(),
        test_path: test_path.clone(),
        verdict,
    }
}

#[cfg(test)]
mod test {
    use std::fs::write;

    use camino::Utf8PathBuf;
    use indoc::indoc;
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;

    fn write_tree(files: &[(&str, &str)]) -> (tempfile::TempDir, Vec<Utf8PathBuf>) {
        let tmp = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (name, content) in files {
            let path = Utf8PathBuf::try_from(tmp.path().join(name)).unwrap();
            write(&path, content).unwrap();
            paths.push(path);
        }
        (tmp, paths)
    }

    #[test]
    fn discover_lists_mutants_in_position_order() {
        let (_tmp, paths) = write_tree(&[(
            "calc.c",
            indoc! {"
                int twice(int x) {
                    return x + x;
                }

                int halve(int x) {
                    return x / 2;
                }
            "},
        )]);
        let mutants = discover_mutants(&paths).unwrap();
        let descriptions = mutants.iter().map(|m| m.describe_change()).collect_vec();
        assert_eq!(
            descriptions,
            [
                "replace + with - in twice",
                "replace / with * in halve"
            ]
        );
        assert_eq!(mutants[0].name(), "mutant_calc_twice_0");
        assert_eq!(mutants[1].name(), "mutant_calc_halve_0");
    }

    #[test]
    fn discover_skips_unreadable_sources() {
        let (_tmp, mut paths) = write_tree(&[("ok.c", "int f(int x) { return x + 1; }\n")]);
        paths.push(Utf8PathBuf::from("missing/gone.c"));
        let mutants = discover_mutants(&paths).unwrap();
        assert_eq!(mutants.len(), 1);
    }

    #[test]
    fn source_without_operators_contributes_nothing() {
        let (_tmp, sources) = write_tree(&[("plain.c", "int zero(void) { return 0; }\n")]);
        let (_tmp2, tests) = write_tree(&[("test_plain_zero.c", "int main(void) { return 0; }\n")]);
        let (_out_tmp, out_base) = {
            let tmp = tempfile::tempdir().unwrap();
            let base = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
            (tmp, base)
        };
        let output_dir = OutputDir::new(&out_base).unwrap();
        let outcome =
            test_mutants(&sources, &tests, &output_dir, &Options::default()).unwrap();
        assert_eq!(outcome.total, 0);
        assert!(outcome.attempts.is_empty());
    }

    #[test]
    fn source_with_no_matching_tests_is_not_counted() {
        let (_tmp, sources) = write_tree(&[("adder.c", "int add(int a, int b) { return a + b; }\n")]);
        let (_tmp2, tests) = write_tree(&[("test_unrelated.c", "int main(void) { return 0; }\n")]);
        let tmp_out = tempfile::tempdir().unwrap();
        let out_base = Utf8PathBuf::try_from(tmp_out.path().to_path_buf()).unwrap();
        let output_dir = OutputDir::new(&out_base).unwrap();
        let outcome =
            test_mutants(&sources, &tests, &output_dir, &Options::default()).unwrap();
        assert_eq!(outcome.total, 0);
        assert!(outcome.attempts.is_empty());
        // No artifact should have been written either.
        assert!(!output_dir.mutant_path("mutant_adder_add_0.c").exists());
    }
}
