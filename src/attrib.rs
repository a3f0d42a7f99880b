// Copyright 2024 Martin Pool

//! Attribute each mutation site to the function that encloses it.
//!
//! This is a best-effort upward scan with a declaration-shaped regex, not a
//! parser. Its contract is only that every site lexically inside the same
//! function body gets the same name, so that sites can be paired with tests
//! named after that function.

use std::sync::OnceLock;

use regex::Regex;

use crate::scanner::Site;

/// Name given to sites with no discoverable enclosing function.
pub const UNKNOWN_FUNCTION: &str = "unknownfunc";

/// Control-flow keywords that the declaration regex can capture but that are
/// never function names.
const RESERVED: &[&str] = &["if", "for", "while", "switch"];

/// Matches `<type and modifiers> <identifier>[<template>](<params>) [const]
/// [throw(...)] {` at the start of a trimmed line.
fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*[\w\s*&:,<>]+?\s+([A-Za-z_][A-Za-z0-9_:]*(?:<[^>]*>)?)\s*\([^)]*\)\s*(?:const)?\s*(?:throw\s*\([^)]*\))?\s*\{",
        )
        .expect("declaration regex is valid")
    })
}

/// Walk upward from `line_index` looking for the enclosing function
/// definition; return [UNKNOWN_FUNCTION] if the top of the file is reached.
pub fn enclosing_function(lines: &[&str], line_index: usize) -> String {
    if lines.is_empty() {
        return UNKNOWN_FUNCTION.to_owned();
    }
    for line in lines[..=line_index.min(lines.len() - 1)].iter().rev() {
        let line = line.trim();
        // Obviously not a definition: comments, preprocessor lines, closing
        // braces, and statements or forward declarations ending in ';'.
        if line.is_empty()
            || line.starts_with("//")
            || line.starts_with("/*")
            || line.starts_with('*')
            || line.starts_with('#')
            || line.starts_with('}')
            || line.ends_with(';')
        {
            continue;
        }
        if let Some(captures) = declaration_re().captures(line) {
            let name = captures.get(1).expect("regex has one group").as_str();
            if !RESERVED.contains(&name) {
                return name.to_owned();
            }
        }
    }
    UNKNOWN_FUNCTION.to_owned()
}

/// Group sites by their enclosing function, in first-seen order.
pub fn group_sites_by_function(lines: &[&str], sites: Vec<Site>) -> Vec<(String, Vec<Site>)> {
    let mut groups: Vec<(String, Vec<Site>)> = Vec::new();
    for site in sites {
        let name = enclosing_function(lines, site.line);
        match groups.iter_mut().find(|(group_name, _)| *group_name == name) {
            Some((_, group)) => group.push(site),
            None => groups.push((name, vec![site])),
        }
    }
    groups
}
