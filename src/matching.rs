// Copyright 2024 Martin Pool

//! Pair sources and functions with test files by file name affinity.
//!
//! Both levels are plain substring matches on the basename without
//! extension: first the source stem selects candidate tests, then the
//! function name narrows them. An empty match set at either level means the
//! corresponding mutants are skipped and not counted.

use camino::Utf8PathBuf;

/// Tests whose stem contains the source file's stem.
pub fn tests_matching_source<'a>(
    test_paths: &'a [Utf8PathBuf],
    source_stem: &str,
) -> Vec<&'a Utf8PathBuf> {
    if source_stem.is_empty() {
        return Vec::new();
    }
    test_paths
        .iter()
        .filter(|path| stem(path).contains(source_stem))
        .collect()
}

/// The subset of `tests` whose stem also contains the function name.
pub fn tests_matching_function<'a>(
    tests: &[&'a Utf8PathBuf],
    function: &str,
) -> Vec<&'a Utf8PathBuf> {
    tests
        .iter()
        .filter(|path| stem(path).contains(function))
        .copied()
        .collect()
}

fn stem(path: &Utf8PathBuf) -> &str {
    path.file_stem().unwrap_or_default()
}
