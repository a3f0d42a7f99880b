// Copyright 2024 Martin Pool

//! Find operator mutation sites in C/C++ source text.
//!
//! The scanner is deliberately not a C/C++ parser: it works line by line on
//! raw text, masking out comments, string literals, character literals and
//! preprocessor directives, and then looks for mutable operators in what
//! remains. The only state carried across lines is whether we are inside a
//! `/* ... */` block comment.

use std::fmt;

/// A position in a source file where one operator can be replaced.
///
/// `line` and `column` are zero-based, and `column` is a byte offset into
/// the raw line, so that `line[column..column + op.len()]` is exactly the
/// operator text.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Site {
    pub line: usize,
    pub column: usize,
    pub op: Operator,
}

/// An operator that can be mutated, paired one-to-one with its replacement.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Operator {
    EqEq,
    NotEq,
    GreaterEq,
    LessEq,
    AndAnd,
    OrOr,
    Plus,
    Minus,
    Star,
    Slash,
    Greater,
    Less,
}

/// All operators, longest first, in the order they are tried at each column.
///
/// Two-character operators must come before their one-character prefixes so
/// that `>=` shadows `>` at the same column.
const OPERATORS: &[Operator] = &[
    Operator::EqEq,
    Operator::NotEq,
    Operator::GreaterEq,
    Operator::LessEq,
    Operator::AndAnd,
    Operator::OrOr,
    Operator::Plus,
    Operator::Minus,
    Operator::Star,
    Operator::Slash,
    Operator::Greater,
    Operator::Less,
];

impl Operator {
    pub fn as_str(&self) -> &'static str {
        use Operator::*;
        match self {
            EqEq => "==",
            NotEq => "!=",
            GreaterEq => ">=",
            LessEq => "<=",
            AndAnd => "&&",
            OrOr => "||",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Greater => ">",
            Less => "<",
        }
    }

    /// The operator this one is rewritten to.
    pub fn replacement(&self) -> Operator {
        use Operator::*;
        match self {
            EqEq => NotEq,
            NotEq => EqEq,
            GreaterEq => LessEq,
            LessEq => GreaterEq,
            AndAnd => OrOr,
            OrOr => AndAnd,
            Plus => Minus,
            Minus => Plus,
            Star => Slash,
            Slash => Star,
            Greater => Less,
            Less => Greater,
        }
    }

    pub fn len(&self) -> usize {
        self.as_str().len()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Find every mutation site in `code`, in order of line and then column.
///
/// Never fails: malformed input just yields fewer sites.
pub fn find_sites(code: &str) -> Vec<Site> {
    let mut sites = Vec::new();
    let mut in_block_comment = false;
    for (line_index, line) in code.lines().enumerate() {
        let masked = mask_line(line, &mut in_block_comment);
        // Preprocessor directives are skipped whole. The test runs against
        // the masked line, so a '#' inside a comment or string does not
        // suppress the line.
        if masked.trim_start().starts_with('#') {
            continue;
        }
        scan_masked_line(line, &masked, line_index, &mut sites);
    }
    sites
}

/// Return a copy of `line` with comments and string/char literals replaced
/// by spaces, one space per byte, so that byte columns are unchanged.
///
/// `in_block_comment` carries the only cross-line state; line comments and
/// unterminated literals end at the newline.
fn mask_line(line: &str, in_block_comment: &mut bool) -> String {
    #[derive(PartialEq)]
    enum Mode {
        Code,
        LineComment,
        Str,
        Char,
    }
    let mut mode = Mode::Code;
    let mut escaped = false;
    let mut masked = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if *in_block_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                masked.push_str("  ");
                *in_block_comment = false;
            } else {
                mask_char(&mut masked, c);
            }
            continue;
        }
        match mode {
            Mode::Code => match c {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    masked.push_str("  ");
                    *in_block_comment = true;
                }
                '/' if chars.peek() == Some(&'/') => {
                    mode = Mode::LineComment;
                    masked.push(' ');
                }
                '"' => {
                    mode = Mode::Str;
                    masked.push(' ');
                }
                '\'' => {
                    mode = Mode::Char;
                    masked.push(' ');
                }
                _ => masked.push(c),
            },
            Mode::LineComment => mask_char(&mut masked, c),
            Mode::Str | Mode::Char => {
                let close = if mode == Mode::Str { '"' } else { '\'' };
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == close {
                    mode = Mode::Code;
                }
                mask_char(&mut masked, c);
            }
        }
    }
    masked
}

fn mask_char(masked: &mut String, c: char) {
    for _ in 0..c.len_utf8() {
        masked.push(' ');
    }
}

/// Scan one masked line for operators, reporting sites against the
/// original line.
fn scan_masked_line(original: &str, masked: &str, line_index: usize, sites: &mut Vec<Site>) {
    let masked_bytes = masked.as_bytes();
    let mut column = 0;
    while column < masked_bytes.len() {
        if let Some(op) = operator_at(masked_bytes, column) {
            if genuine_site(original, column, op) {
                sites.push(Site {
                    line: line_index,
                    column,
                    op,
                });
                column += op.len();
                continue;
            }
        }
        column += 1;
    }
}

fn operator_at(masked_bytes: &[u8], column: usize) -> Option<Operator> {
    OPERATORS
        .iter()
        .copied()
        .find(|op| masked_bytes[column..].starts_with(op.as_str().as_bytes()))
}

/// Re-check the match against the original, unmasked line.
///
/// The masked and original lines have identical byte layout, so this only
/// fails if the masker and scanner disagree; in particular a `/` that opens
/// a comment must never become a site.
fn genuine_site(original: &str, column: usize, op: Operator) -> bool {
    let bytes = original.as_bytes();
    let end = column + op.len();
    if bytes.len() < end || &bytes[column..end] != op.as_str().as_bytes() {
        return false;
    }
    if op == Operator::Slash {
        !matches!(bytes.get(column + 1), Some(b'/') | Some(b'*'))
    } else {
        true
    }
}

#[cfg(test)]
mod test {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn site_triples(code: &str) -> Vec<(usize, usize, &'static str)> {
        find_sites(code)
            .iter()
            .map(|site| (site.line, site.column, site.op.as_str()))
            .collect()
    }

    #[test]
    fn sites_are_positional_and_ordered() {
        let code = "int f(int a, int b) { return a + b * 2; }\n";
        assert_eq!(site_triples(code), [(0, 31, "+"), (0, 35, "*")]);
    }

    #[test]
    fn every_site_slice_matches_its_operator() {
        let code = indoc! {r#"
            int f(int a, int b) {
                if (a >= b && a != 0) {
                    return a / b;
                }
                return a - b;
            }
        "#};
        let lines: Vec<&str> = code.lines().collect();
        let sites = find_sites(code);
        assert!(!sites.is_empty());
        for site in sites {
            let op = site.op.as_str();
            assert_eq!(&lines[site.line][site.column..site.column + op.len()], op);
        }
    }

    #[test]
    fn longer_operators_shadow_shorter_prefixes() {
        assert_eq!(site_triples("a >= b"), [(0, 2, ">=")]);
        assert_eq!(site_triples("a <= b"), [(0, 2, "<=")]);
        assert_eq!(site_triples("a == b"), [(0, 2, "==")]);
        assert_eq!(site_triples("a != b"), [(0, 2, "!=")]);
        assert_eq!(site_triples("a && b"), [(0, 2, "&&")]);
        assert_eq!(site_triples("a || b"), [(0, 2, "||")]);
    }

    #[test]
    fn line_comment_is_masked() {
        let code = indoc! {"
            // if (x == y) return 1;
            return x+y;
        "};
        assert_eq!(site_triples(code), [(1, 8, "+")]);
    }

    #[test]
    fn division_adjacent_to_line_comment_yields_no_site() {
        assert!(site_triples("x /// comment\n").is_empty());
    }

    #[test]
    fn division_before_block_comment_yields_no_site() {
        assert!(site_triples("x /**/ y\n").is_empty());
        assert_eq!(site_triples("a / b\n"), [(0, 2, "/")]);
    }

    #[test]
    fn block_comment_spanning_lines_is_masked() {
        let code = indoc! {"
            /* a + b
               c * d
            */
            return a - b;
        "};
        assert_eq!(site_triples(code), [(3, 9, "-")]);
    }

    #[test]
    fn code_resumes_after_block_comment_closes_mid_line() {
        assert_eq!(site_triples("a /* + */ - b\n"), [(0, 10, "-")]);
    }

    #[test]
    fn string_contents_are_masked() {
        let code = indoc! {r#"
            const char *s = "a==b";
            if (a==b) return 0;
        "#};
        // The pointer star is a genuine site to this scanner; the quoted
        // operator text is not.
        assert_eq!(site_triples(code), [(0, 11, "*"), (1, 5, "==")]);
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        assert!(site_triples(r#"s = "a \" + b";"#).is_empty());
        assert_eq!(site_triples(r#"s = "a \\" + b;"#), [(0, 11, "+")]);
    }

    #[test]
    fn char_literals_are_masked() {
        assert_eq!(site_triples("if (c == '+') n = n + 1;\n"), [(0, 6, "=="), (0, 20, "+")]);
        assert_eq!(site_triples(r"c = '\''; a + b;"), [(0, 12, "+")]);
    }

    #[test]
    fn preprocessor_lines_are_skipped() {
        assert!(site_triples("#define ADD(a, b) ((a) + (b))\n").is_empty());
        assert!(site_triples("   #  include <stdio.h>\n").is_empty());
    }

    #[test]
    fn hash_inside_string_does_not_skip_the_line() {
        assert_eq!(site_triples(r##"s = "#x" ; y = a + b;"##), [(0, 17, "+")]);
    }

    #[test]
    fn string_and_literal_modes_end_at_newline() {
        let code = indoc! {r#"
            s = "unterminated
            a + b;
        "#};
        assert_eq!(site_triples(code), [(1, 2, "+")]);
    }

    #[test]
    fn arrow_splits_into_minus_and_greater() {
        assert_eq!(site_triples("p->x\n"), [(0, 1, "-"), (0, 2, ">")]);
    }

    #[test]
    fn adjacent_increments_yield_two_sites() {
        assert_eq!(site_triples("x++;\n"), [(0, 1, "+"), (0, 2, "+")]);
    }

    #[test]
    fn multibyte_characters_in_comments_keep_byte_columns() {
        // "é" is two bytes; masking must not shift later columns.
        assert_eq!(site_triples("/* é */ a + b\n"), [(0, 11, "+")]);
    }

    #[test]
    fn no_sites_in_operator_free_source() {
        assert!(site_triples("int main(void) { return 0; }\n").is_empty());
    }

    #[test]
    fn replacement_map_is_an_involution() {
        for op in OPERATORS {
            assert_eq!(op.replacement().replacement(), *op);
            assert_ne!(op.replacement(), *op);
        }
    }
}
