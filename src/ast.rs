//! # Parsed Song Types
//!
//! This module defines the structured representation produced by the parser.
//!
//! ## Type Hierarchy
//! ```text
//! ParsedSong
//!   ├── Directives (ordered, case-insensitive lookup)
//!   │     └── Vec<Directive> { name, raw_name, value, line }
//!   ├── Vec<Line>
//!   │     ├── number: source line (1-based)
//!   │     └── Vec<Segment>
//!   │           ├── chord: Option<ChordToken>
//!   │           ├── annotation: Option<String>  (bracket text that is not a chord)
//!   │           └── lyric: String
//!   └── Vec<ParseWarning>
//! ```
//!
//! ## Key Concepts
//!
//! ### Segments
//! A segment is the lyric fragment that follows one chord bracket, up to the
//! next bracket or the end of the line. Text before the first bracket is a
//! segment with no chord. Concatenating the lyrics of a line's segments gives
//! the line with every `[...]` and `{...}` span removed, character for character.
//!
//! ### Directives
//! Names are stored lower-cased in `name` and as written in `raw_name`.
//! Lookup is by lower-cased name. Repeated directives (several
//! `{comment: ...}` lines) are all kept in source order.
//!
//! ### Lines
//! Source lines holding only directives produce no `Line`. Blank source
//! lines produce a `Line` with a single empty segment, so stanza breaks survive.

use crate::vocabulary::ChordToken;
use serde::{Deserialize, Serialize};

/// A chord (or non-chord annotation) and the lyric text it sits on
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub chord: Option<ChordToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub lyric: String,
}

impl Segment {
    pub fn lyric(text: impl Into<String>) -> Self {
        Self {
            chord: None,
            annotation: None,
            lyric: text.into(),
        }
    }

    pub fn with_chord(chord: ChordToken, text: impl Into<String>) -> Self {
        Self {
            chord: Some(chord),
            annotation: None,
            lyric: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub number: usize,
    pub segments: Vec<Segment>,
}

impl Line {
    /// The line's lyric text with all chords stripped
    pub fn lyrics(&self) -> String {
        self.segments.iter().map(|s| s.lyric.as_str()).collect()
    }

    pub fn chords(&self) -> impl Iterator<Item = &ChordToken> {
        self.segments.iter().filter_map(|s| s.chord.as_ref())
    }

    pub fn has_chords(&self) -> bool {
        self.chords().next().is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.segments
            .iter()
            .all(|s| s.chord.is_none() && s.annotation.is_none() && s.lyric.trim().is_empty())
    }
}

/// A `{name: value}` or `{name}` span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    pub raw_name: String,
    pub value: Option<String>,
    pub line: usize,
}

impl Directive {
    pub fn new(raw_name: &str, value: Option<&str>, line: usize) -> Self {
        let raw_name = raw_name.trim();
        Self {
            name: raw_name.to_lowercase(),
            raw_name: raw_name.to_string(),
            value: value.map(|v| v.trim().to_string()),
            line,
        }
    }
}

/// Directives in source order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directives(Vec<Directive>);

impl Directives {
    pub fn push(&mut self, directive: Directive) {
        self.0.push(directive);
    }

    /// Value of the first directive called `name` (case-insensitive) that has one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).find_map(|d| d.value.as_deref())
    }

    /// Every directive called `name`, in order.
    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Directive> + 'a {
        let name = name.to_lowercase();
        self.0.iter().filter(move |d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).next().is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Directive> {
        self.0.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Directive> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Directives {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Non-fatal parse finding with location (1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Complete parsed chord sheet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedSong {
    pub directives: Directives,
    pub lines: Vec<Line>,
    #[serde(default)]
    pub warnings: Vec<ParseWarning>,
}

impl ParsedSong {
    /// Every chord in the song, in reading order
    pub fn chords(&self) -> impl Iterator<Item = &ChordToken> {
        self.lines.iter().flat_map(|line| line.chords())
    }

    /// Distinct chords in order of first appearance
    pub fn unique_chords(&self) -> Vec<&ChordToken> {
        let mut seen: Vec<&ChordToken> = Vec::new();
        for chord in self.chords() {
            if !seen.contains(&chord) {
                seen.push(chord);
            }
        }
        seen
    }

    /// Lyrics of every line joined with newlines
    pub fn lyrics_text(&self) -> String {
        self.lines
            .iter()
            .map(Line::lyrics)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
