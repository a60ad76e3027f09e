//! Output stage.
//!
//! Rendering is a separate concern from parsing: UI stacks implement
//! [`Renderer`] for their own output type. Two text renderers ship here.
//!
//! - [`ChordProRenderer`] writes a song back to ChordPro. Directives are
//!   emitted at the start of the source line they came from, as
//!   `{raw_name: value}`. Parsing the output yields the same lines, chords,
//!   annotations and directives.
//! - [`ChordsOverLyrics`] lays chords out on a row above their lyrics.

use crate::ast::{Line, ParsedSong, Segment};

pub trait Renderer {
    type Output;

    fn render(&self, song: &ParsedSong) -> Self::Output;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChordProRenderer;

impl Renderer for ChordProRenderer {
    type Output = String;

    fn render(&self, song: &ParsedSong) -> String {
        // (source line, directives first, text)
        let mut parts: Vec<(usize, u8, String)> = Vec::new();
        for directive in &song.directives {
            let text = match &directive.value {
                Some(value) => format!("{{{}: {}}}", directive.raw_name, value),
                None => format!("{{{}}}", directive.raw_name),
            };
            parts.push((directive.line, 0, text));
        }
        for line in &song.lines {
            parts.push((line.number, 1, chordpro_line(line)));
        }
        parts.sort_by_key(|(number, kind, _)| (*number, *kind));

        let mut out: Vec<String> = Vec::new();
        let mut current: Option<usize> = None;
        for (number, _, text) in parts {
            match (current, out.last_mut()) {
                (Some(n), Some(last)) if n == number => last.push_str(&text),
                _ => out.push(text),
            }
            current = Some(number);
        }
        out.join("\n")
    }
}

fn chordpro_line(line: &Line) -> String {
    let mut text = String::new();
    for segment in &line.segments {
        if let Some(label) = bracket_label(segment) {
            text.push('[');
            text.push_str(&label);
            text.push(']');
        }
        text.push_str(&segment.lyric);
    }
    text
}

fn bracket_label(segment: &Segment) -> Option<String> {
    match (&segment.chord, &segment.annotation) {
        (Some(chord), _) => Some(chord.to_string()),
        (None, Some(annotation)) => Some(annotation.clone()),
        (None, None) => None,
    }
}

/// Two-row text layout: chords above the syllable they start on.
/// Lines without chords render as a single lyric row. Directives are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordsOverLyrics;

impl Renderer for ChordsOverLyrics {
    type Output = String;

    fn render(&self, song: &ParsedSong) -> String {
        song.lines
            .iter()
            .map(chords_over_lyrics)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn chords_over_lyrics(line: &Line) -> String {
    if line.segments.iter().all(|s| bracket_label(s).is_none()) {
        return line.lyrics();
    }

    let mut chord_row = String::new();
    let mut lyric_row = String::new();
    let mut chord_width = 0;
    let mut lyric_width = 0;

    for segment in &line.segments {
        if let Some(label) = bracket_label(segment) {
            // Leave one space after the previous chord
            let start = if chord_width > 0 {
                lyric_width.max(chord_width + 1)
            } else {
                lyric_width
            };
            pad(&mut chord_row, &mut chord_width, start);
            pad(&mut lyric_row, &mut lyric_width, start);
            chord_row.push_str(&label);
            chord_width += label.chars().count();
        }
        lyric_row.push_str(&segment.lyric);
        lyric_width += segment.lyric.chars().count();
    }

    format!("{}\n{}", chord_row.trim_end(), lyric_row.trim_end())
}

fn pad(row: &mut String, width: &mut usize, to: usize) {
    while *width < to {
        row.push(' ');
        *width += 1;
    }
}
