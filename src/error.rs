//! # Error Types
//!
//! This module defines all error types for the chord-sheet engine.
//!
//! Parse errors carry line/column information so editors can point at the
//! offending span. Validation problems are not errors: they are reported
//! through [`ValidationReport`](crate::validator::ValidationReport).
//!
//! ## Error Types
//! - `ParseError` - Blank input, or a chord bracket / directive brace left open on its line
//! - `TransposeError` - Shift outside -11..=11, or a chord that cannot be rebuilt
//! - `ConfigError` - Invalid YAML engine configuration
//! - `ChordSheetError` - Umbrella for call sites that parse and transpose in one go
//!
//! ## Usage
//! ```rust
//! use chordsheet::{parse, ParseError};
//!
//! match parse("[G]Amazing [C") {
//!     Ok(song) => println!("{} lines", song.lines.len()),
//!     Err(ParseError::Malformed { line, column, reason }) => {
//!         eprintln!("Parse error at {}:{}: {}", line, column, reason);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The content is empty or whitespace-only.
    ///
    /// # Example
    /// ```
    /// # use chordsheet::ParseError;
    /// assert_eq!(ParseError::Empty.to_string(), "Chord sheet is empty");
    /// ```
    #[error("Chord sheet is empty")]
    Empty,

    /// Structural error with location information (1-based line and column).
    ///
    /// # Example
    /// ```
    /// # use chordsheet::ParseError;
    /// let err = ParseError::Malformed {
    ///     line: 3,
    ///     column: 7,
    ///     reason: "Chord bracket '[' is never closed".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Parse error at line 3, column 7: Chord bracket '[' is never closed"
    /// );
    /// ```
    #[error("Parse error at line {line}, column {column}: {reason}")]
    Malformed {
        line: usize,
        column: usize,
        reason: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransposeError {
    /// Requested shift lies outside -11..=11.
    #[error("Transposition of {semitones} semitones is out of bounds (allowed: -11 to 11)")]
    OutOfBounds { semitones: i32 },

    /// A chord could not be rebuilt after shifting. Nothing is transposed when this occurs.
    #[error("Invalid chord '{token}' cannot be transposed")]
    InvalidChord { token: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration YAML: {0}")]
    Yaml(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure of any stage, for callers that chain parsing and transposition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordSheetError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transpose(#[from] TransposeError),
}
