// Copyright 2024 Martin Pool

//! A mutant: one operator substitution applied to one source file.

use std::fmt;

use anyhow::ensure;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use similar::TextDiff;

use crate::scanner::Site;
use crate::source::SourceFile;
use crate::Result;

/// One possible mutation: a site in a source file, the function it lives in,
/// and its index among that function's sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutant {
    pub source_file: SourceFile,
    pub function: String,
    pub index: usize,
    pub site: Site,
}

impl Mutant {
    pub fn new(source_file: SourceFile, function: String, index: usize, site: Site) -> Mutant {
        Mutant {
            source_file,
            function,
            index,
            site,
        }
    }

    /// The artifact stem, `mutant_<source>_<function>_<index>`, also used
    /// for the compiled binary.
    pub fn name(&self) -> String {
        format!(
            "mutant_{}_{}_{}",
            self.source_file.stem(),
            self.function,
            self.index
        )
    }

    /// The artifact file name, keeping the source's extension so the
    /// compiler treats the mutant as the same language.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name(), self.source_file.extension())
    }

    /// Return the whole file text with this one substitution applied.
    ///
    /// Fails if the site no longer points at its operator, which means the
    /// scanner and rewriter have come apart; the caller should drop just
    /// this mutant.
    pub fn mutated_code(&self) -> Result<String> {
        let code = &*self.source_file.code;
        let mut lines: Vec<&str> = code.lines().collect();
        let op = self.site.op.as_str();
        let found = lines
            .get(self.site.line)
            .and_then(|line| line.get(self.site.column..self.site.column + op.len()));
        ensure!(
            found == Some(op),
            "mutation site desynchronized in {} at {}:{}: expected {op:?}, found {found:?}",
            self.source_file.path,
            self.site.line,
            self.site.column,
        );
        let line = lines[self.site.line];
        let mutated_line = format!(
            "{}{}{}",
            &line[..self.site.column],
            self.site.op.replacement(),
            &line[self.site.column + op.len()..]
        );
        lines[self.site.line] = &mutated_line;
        let mut mutated = lines.join("\n");
        if code.ends_with('\n') {
            mutated.push('\n');
        }
        Ok(mutated)
    }

    /// Return a unified diff from the original file to the mutant.
    pub fn diff(&self) -> Result<String> {
        let mutated = self.mutated_code()?;
        Ok(TextDiff::from_lines(self.source_file.code.as_str(), &mutated)
            .unified_diff()
            .context_radius(8)
            .header(self.source_file.path.as_str(), &self.name())
            .to_string())
    }

    /// Describe the mutation briefly, not including the location.
    pub fn describe_change(&self) -> String {
        format!(
            "replace {} with {} in {}",
            self.site.op,
            self.site.op.replacement(),
            self.function
        )
    }
}

impl fmt::Display for Mutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Line and column are 1-based for display and JSON output.
        write!(
            f,
            "{}:{}:{}: {}",
            self.source_file.path,
            self.site.line + 1,
            self.site.column + 1,
            self.describe_change(),
        )
    }
}

impl Serialize for Mutant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut ss = serializer.serialize_struct("Mutant", 6)?;
        ss.serialize_field("file", self.source_file.path.as_str())?;
        ss.serialize_field("function", &self.function)?;
        ss.serialize_field("line", &(self.site.line + 1))?;
        ss.serialize_field("column", &(self.site.column + 1))?;
        ss.serialize_field("original", self.site.op.as_str())?;
        ss.serialize_field("replacement", self.site.op.replacement().as_str())?;
        ss.end()
    }
}
