// Copyright 2024 Martin Pool

//! Collect C/C++ source and test files from file or directory arguments.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::Result;

/// Extensions accepted as C/C++ sources, headers included.
const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp"];

/// Expand a list of file or directory paths into the C/C++ files they name.
///
/// Directories are walked recursively in file name order. Paths that don't
/// exist get a warning and are skipped. Returned paths are absolute;
/// duplicates are permitted.
pub fn collect_source_files(paths: &[Utf8PathBuf]) -> Result<Vec<Utf8PathBuf>> {
    let mut collected = Vec::new();
    for path in paths {
        if path.is_file() {
            if has_source_extension(path) {
                collected.push(absolute(path)?);
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|entry| {
                entry
                    .map_err(|err| warn!("error walking {path}: {err}"))
                    .ok()
            }) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(entry_path) = Utf8Path::from_path(entry.path()) else {
                    warn!("skipping non-UTF-8 path {:?}", entry.path());
                    continue;
                };
                if has_source_extension(entry_path) {
                    collected.push(absolute(entry_path)?);
                }
            }
        } else {
            warn!("path not found or is not a file or directory: {path}");
        }
    }
    if collected.is_empty() {
        debug!("no C/C++ files found in {paths:?}");
    }
    Ok(collected)
}

fn has_source_extension(path: &Utf8Path) -> bool {
    path.extension()
        .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if path.is_absolute() {
        Ok(path.to_owned())
    } else {
        Ok(Utf8PathBuf::try_from(std::env::current_dir()?)?.join(path))
    }
}

#[cfg(test)]
mod test {
    use std::fs::{create_dir, write};

    use pretty_assertions::assert_eq;

    use super::*;

    fn file_names(paths: &[Utf8PathBuf]) -> Vec<&str> {
        paths.iter().filter_map(|p| p.file_name()).collect()
    }

    #[test]
    fn collects_only_c_cpp_extensions_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root.join("alpha.c"), "int a;").unwrap();
        write(root.join("beta.cpp"), "int b;").unwrap();
        write(root.join("gamma.hpp"), "int g;").unwrap();
        write(root.join("notes.txt"), "no").unwrap();
        create_dir(root.join("sub")).unwrap();
        write(root.join("sub/delta.h"), "int d;").unwrap();
        let arg = Utf8PathBuf::try_from(root.to_path_buf()).unwrap();
        let collected = collect_source_files(&[arg]).unwrap();
        assert_eq!(
            file_names(&collected),
            ["alpha.c", "beta.cpp", "gamma.hpp", "delta.h"]
        );
        assert!(collected.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn single_file_argument() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("only.c");
        write(&file, "int x;").unwrap();
        let arg = Utf8PathBuf::try_from(file).unwrap();
        let collected = collect_source_files(std::slice::from_ref(&arg)).unwrap();
        assert_eq!(file_names(&collected), ["only.c"]);
    }

    #[test]
    fn wrong_extension_file_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("script.py");
        write(&file, "pass").unwrap();
        let arg = Utf8PathBuf::try_from(file).unwrap();
        assert!(collect_source_files(&[arg]).unwrap().is_empty());
    }

    #[test]
    fn missing_path_is_skipped_not_fatal() {
        let arg = Utf8PathBuf::from("does/not/exist");
        assert!(collect_source_files(&[arg]).unwrap().is_empty());
    }
}
