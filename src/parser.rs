//! # Parser Module
//!
//! This module turns ChordPro text into a [`ParsedSong`].
//!
//! ## Algorithm
//! Parsing is line-oriented. Each source line is tokenized by the
//! [`Lexer`](crate::lexer::Lexer) and scanned left to right:
//! - `{...}` spans are appended to the song's directives
//! - `[...]` spans start a new [`Segment`]; the text after them is its lyric
//! - text before the first bracket becomes a segment with no chord
//!
//! A `[` or `{` that is not closed on its own line is a
//! [`ParseError::Malformed`]. Bracket text that fails the chord grammar is
//! not an error: it is kept as the segment's `annotation` and reported in
//! [`ParsedSong::warnings`].
//!
//! ## Entry Point
//! `parse(source: &str) -> Result<ParsedSong, ParseError>`
//!
//! ## Example
//! ```rust
//! use chordsheet::parse;
//!
//! let song = parse("{title: Amazing Grace}\n[G]Amazing [C]grace").unwrap();
//! assert_eq!(song.directives.get("title"), Some("Amazing Grace"));
//! assert_eq!(song.lines.len(), 1);
//! assert_eq!(song.lines[0].segments[1].lyric, "grace");
//! assert_eq!(song.lines[0].lyrics(), "Amazing grace");
//! ```

use crate::ast::{Directive, Line, ParseWarning, ParsedSong, Segment};
use crate::error::ParseError;
use crate::lexer::{Lexer, LocatedToken, Token};
use crate::validator::is_bare_directive;
use crate::vocabulary::ChordToken;

/// Builds a song one source line at a time
struct Parser {
    song: ParsedSong,
}

impl Parser {
    fn new() -> Self {
        Self {
            song: ParsedSong::default(),
        }
    }

    fn parse_line(&mut self, number: usize, text: &str) -> Result<(), ParseError> {
        let tokens = Lexer::new(text, number).tokenize()?;

        let directive_only = tokens.iter().any(|t| matches!(t.token, Token::Directive { .. }))
            && tokens.iter().all(|t| match &t.token {
                Token::Directive { .. } => true,
                Token::Text(s) => s.trim().is_empty(),
                Token::Chord(_) => false,
            });

        let mut segments = Vec::new();
        let mut current = Segment::default();

        for LocatedToken { token, line, column } in tokens {
            match token {
                Token::Text(text) => current.lyric.push_str(&text),
                Token::Chord(inner) => {
                    if current != Segment::default() {
                        segments.push(std::mem::take(&mut current));
                    }
                    match ChordToken::parse(&inner) {
                        Some(chord) => current.chord = Some(chord),
                        None => {
                            self.warn(line, column, format!("'[{}]' is not a recognized chord; kept as annotation", inner));
                            current.annotation = Some(inner);
                        }
                    }
                }
                Token::Directive { name, value } => {
                    if value.is_none() && !is_bare_directive(&name) {
                        self.warn(line, column, format!("Directive '{{{}}}' has no value", name.trim()));
                    }
                    self.song
                        .directives
                        .push(Directive::new(&name, value.as_deref(), line));
                }
            }
        }

        if directive_only {
            return Ok(());
        }

        segments.push(current);
        self.song.lines.push(Line { number, segments });
        Ok(())
    }

    fn warn(&mut self, line: usize, column: usize, message: String) {
        self.song.warnings.push(ParseWarning { line, column, message });
    }
}

/// Parse ChordPro text into a structured song
pub fn parse(source: &str) -> Result<ParsedSong, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser::new();
    for (i, text) in source.lines().enumerate() {
        parser.parse_line(i + 1, text)?;
    }

    let song = parser.song;
    tracing::debug!(
        lines = song.lines.len(),
        directives = song.directives.len(),
        warnings = song.warnings.len(),
        "Parsed chord sheet"
    );
    Ok(song)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source line with every `[...]` and `{...}` span removed
    fn strip_spans(line: &str) -> String {
        let no_chords = crate::lexer::CHORD_SPAN.replace_all(line, "");
        crate::lexer::DIRECTIVE_SPAN.replace_all(&no_chords, "").into_owned()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("  \n \t\n"), Err(ParseError::Empty));
    }

    #[test]
    fn test_simple_line() {
        let song = parse("[G]Amazing [C]grace").unwrap();
        assert_eq!(song.lines.len(), 1);
        let segments = &song.lines[0].segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].chord.as_ref().unwrap().to_string(), "G");
        assert_eq!(segments[0].lyric, "Amazing ");
        assert_eq!(segments[1].chord.as_ref().unwrap().to_string(), "C");
        assert_eq!(segments[1].lyric, "grace");
    }

    #[test]
    fn test_line_without_chords_is_single_segment() {
        let song = parse("How sweet the sound").unwrap();
        assert_eq!(song.lines[0].segments, vec![Segment::lyric("How sweet the sound")]);
    }

    #[test]
    fn test_text_before_first_chord() {
        let song = parse("Oh [G]Lord").unwrap();
        let segments = &song.lines[0].segments;
        assert_eq!(segments[0].chord, None);
        assert_eq!(segments[0].lyric, "Oh ");
        assert_eq!(segments[1].lyric, "Lord");
    }

    #[test]
    fn test_adjacent_chords() {
        let song = parse("[C][G]Yes").unwrap();
        let segments = &song.lines[0].segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].lyric, "");
        assert_eq!(segments[1].chord.as_ref().unwrap().to_string(), "G");
        assert_eq!(segments[1].lyric, "Yes");
    }

    #[test]
    fn test_directives_are_collected_not_lines() {
        let song = parse("{Title: Amazing Grace}\n{key: G}\n{comment: Verse 1}\n[G]Amazing\n{comment: Chorus}").unwrap();
        assert_eq!(song.lines.len(), 1);
        assert_eq!(song.lines[0].number, 4);
        assert_eq!(song.directives.get("title"), Some("Amazing Grace"));
        assert_eq!(song.directives.iter().next().unwrap().raw_name, "Title");
        let comments: Vec<_> = song.directives.get_all("comment").map(|d| d.line).collect();
        assert_eq!(comments, vec![3, 5]);
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let song = parse("[G]One\n\n[C]Two").unwrap();
        assert_eq!(song.lines.len(), 3);
        assert!(song.lines[1].is_blank());
        assert_eq!(song.lines[1].segments, vec![Segment::default()]);
    }

    #[test]
    fn test_unclosed_bracket_is_malformed() {
        let err = parse("{title: X}\n[C]Amazing [Grace").unwrap_err();
        assert_eq!(
            err,
            ParseError::Malformed {
                line: 2,
                column: 12,
                reason: "Chord bracket '[' is never closed".to_string(),
            }
        );
    }

    #[test]
    fn test_brace_does_not_span_lines() {
        let err = parse("{title: Amazing\nGrace}").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line: 1, column: 1, .. }));
    }

    #[test]
    fn test_unrecognized_bracket_is_annotation_with_warning() {
        let song = parse("[G]Amazing [x2]grace").unwrap();
        let segments = &song.lines[0].segments;
        assert_eq!(segments[1].chord, None);
        assert_eq!(segments[1].annotation.as_deref(), Some("x2"));
        assert_eq!(segments[1].lyric, "grace");
        assert_eq!(song.warnings.len(), 1);
        assert_eq!(song.warnings[0].line, 1);
        assert_eq!(song.warnings[0].column, 12);
        assert_eq!(song.lines[0].lyrics(), "Amazing grace");
    }

    #[test]
    fn test_bogus_bare_directive_parses_with_warning() {
        let song = parse("{bogus}").unwrap();
        assert!(song.lines.is_empty());
        assert!(song.directives.contains("bogus"));
        assert_eq!(song.warnings.len(), 1);
    }

    #[test]
    fn test_inline_directive_is_removed_from_lyrics() {
        let song = parse("Hello {c: softly}[G]there").unwrap();
        assert_eq!(song.lines[0].lyrics(), "Hello there");
        assert_eq!(song.directives.get("c"), Some("softly"));
    }

    #[test]
    fn test_lyrics_round_trip() {
        let source = "{title: Amazing Grace}\n\
                      [G]Amazing [G7]grace, how [C]sweet the [G]sound\n\
                      That saved a [Em]wretch like [D/F#]me\n\
                      \n\
                      I [G]once was [Bbmaj7]lost  but [C]now am [G]found  \n\
                      Plain text with ] stray bracket\n\
                      [D]";
        let song = parse(source).unwrap();
        let expected: Vec<String> = source
            .lines()
            .filter(|l| !(l.contains('{') && strip_spans(l).trim().is_empty()))
            .map(strip_spans)
            .collect();
        let actual: Vec<String> = song.lines.iter().map(|l| l.lyrics()).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_crlf_line_endings() {
        let song = parse("{key: D}\r\n[D]Holy\r\n").unwrap();
        assert_eq!(song.directives.get("key"), Some("D"));
        assert_eq!(song.lines.len(), 1);
        assert_eq!(song.lines[0].lyrics(), "Holy");
    }
}
