//! # Content Validation Module
//!
//! Structural sanity checks on raw chord-sheet text, without parsing it.
//!
//! ## Purpose
//! Editors want live feedback while the user types. This module reports
//! problems as plain messages and never blocks parsing: a report with
//! errors is a hint that [`parse`](crate::parse) will probably fail, nothing more.
//!
//! ## Validation Rules
//!
//! ### Errors
//! - Content is empty or whitespace-only
//! - The number of `[` differs from the number of `]`
//!
//! ### Warnings
//! - A `{...}` span with no `:` whose name is not a bare section directive
//!   (`chorus`, `verse`, `bridge`, `tag`, `comment`, `c`)
//! - A `[...]` span outside any directive whose text is not a chord
//! - The number of `{` differs from the number of `}`
//!
//! ## Entry Point
//! `validate(raw: &str) -> ValidationReport`
//!
//! ## Example
//! ```rust
//! use chordsheet::validate;
//!
//! let report = validate("[C]Amazing [Grace");
//! assert!(!report.is_valid);
//! assert_eq!(report.errors.len(), 1);
//!
//! let report = validate("{bogus}");
//! assert!(report.is_valid);
//! assert_eq!(report.warnings.len(), 1);
//! ```

use crate::lexer::{CHORD_SPAN, DIRECTIVE_SPAN};
use crate::vocabulary::is_valid_chord;
use serde::{Deserialize, Serialize};

/// Directive names allowed without a `: value`
pub const BARE_DIRECTIVES: [&str; 6] = ["chorus", "verse", "bridge", "tag", "comment", "c"];

pub fn is_bare_directive(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    BARE_DIRECTIVES.contains(&name.as_str())
}

/// Advisory result of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_findings(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }
}

/// Check raw content for structural problems
pub fn validate(raw: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if raw.trim().is_empty() {
        errors.push("Content is empty".to_string());
        return ValidationReport { is_valid: false, errors, warnings };
    }

    if let Some(message) = check_balance(raw, '[', ']', "chord brackets") {
        errors.push(message);
    }
    if let Some(message) = check_balance(raw, '{', '}', "directive braces") {
        warnings.push(message);
    }

    for (i, line) in raw.lines().enumerate() {
        check_directives(line, i + 1, &mut warnings);
        check_chords(line, i + 1, &mut warnings);
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_balance(raw: &str, open: char, close: char, what: &str) -> Option<String> {
    let opened = raw.chars().filter(|&c| c == open).count();
    let closed = raw.chars().filter(|&c| c == close).count();
    if opened == closed {
        return None;
    }
    Some(format!(
        "Unmatched {}: {} '{}' but {} '{}'",
        what, opened, open, closed, close
    ))
}

/// Flag `{name}` spans that are neither `name: value` nor a known section
fn check_directives(line: &str, line_number: usize, warnings: &mut Vec<String>) {
    for caps in DIRECTIVE_SPAN.captures_iter(line) {
        let inner = &caps[1];
        if !inner.contains(':') && !is_bare_directive(inner) {
            warnings.push(format!(
                "Line {}: directive '{{{}}}' has no ':' separator and is not a known section name",
                line_number, inner
            ));
        }
    }
}

/// Flag `[...]` spans outside directives whose text is not a chord
fn check_chords(line: &str, line_number: usize, warnings: &mut Vec<String>) {
    let outside_directives = DIRECTIVE_SPAN.replace_all(line, "");
    for caps in CHORD_SPAN.captures_iter(&outside_directives) {
        let inner = &caps[1];
        if !is_valid_chord(inner) {
            warnings.push(format!(
                "Line {}: '[{}]' is not a valid chord",
                line_number, inner
            ));
        }
    }
}
