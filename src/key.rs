//! # Key Detection
//!
//! Finds the original key of a song. The first rule that yields a key wins:
//!
//! 1. `key` in the extracted metadata, if it names a valid key
//! 2. a `{key: X}` directive in the song (or literally in raw text)
//! 3. the most frequent chord root; ties go to the root heard first
//! 4. otherwise `None`
//!
//! Rule 3 is a frequency count, not music theory: it ignores scale degrees,
//! so a song that leans on its IV chord reports the IV as its key. Callers
//! should prefer an explicit `{key}` directive wherever one exists.

use crate::ast::ParsedSong;
use crate::lexer::{CHORD_SPAN, DIRECTIVE_SPAN};
use crate::metadata::ChordSheetMetadata;
use crate::vocabulary::{ChordToken, KeyName, PitchClass};
use serde::{Deserialize, Serialize};

/// Which rule produced a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySource {
    Metadata,
    Directive,
    ChordFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedKey {
    pub key: PitchClass,
    pub source: KeySource,
}

/// Detect the key of a parsed song
///
/// # Example
/// ```
/// use chordsheet::{detect_key, parse, PitchClass};
///
/// let song = parse("[C]One [G]two [C]three [Am]four").unwrap();
/// assert_eq!(detect_key(&song, None), Some(PitchClass::C));
/// ```
pub fn detect_key(song: &ParsedSong, metadata: Option<&ChordSheetMetadata>) -> Option<PitchClass> {
    detect_key_with_source(song, metadata).map(|d| d.key)
}

pub fn detect_key_with_source(
    song: &ParsedSong,
    metadata: Option<&ChordSheetMetadata>,
) -> Option<DetectedKey> {
    from_metadata(metadata)
        .or_else(|| {
            song.directives
                .get_all("key")
                .filter_map(|d| d.value.as_deref())
                .find_map(KeyName::parse)
                .map(|k| DetectedKey { key: k.pitch_class(), source: KeySource::Directive })
        })
        .or_else(|| {
            most_frequent_root(song.chords())
                .map(|key| DetectedKey { key, source: KeySource::ChordFrequency })
        })
}

/// Detect the key straight from unparsed text. Works on content the
/// parser rejects: only closed `[...]` spans that are valid chords count.
pub fn detect_key_in_raw(raw: &str, metadata: Option<&ChordSheetMetadata>) -> Option<PitchClass> {
    if let Some(detected) = from_metadata(metadata) {
        return Some(detected.key);
    }

    let directive_key = DIRECTIVE_SPAN
        .captures_iter(raw)
        .filter_map(|caps| {
            let (name, value) = caps.get(1)?.as_str().split_once(':')?;
            name.trim().eq_ignore_ascii_case("key").then_some(value)
        })
        .find_map(KeyName::parse);
    if let Some(key) = directive_key {
        return Some(key.pitch_class());
    }

    let chords: Vec<ChordToken> = CHORD_SPAN
        .captures_iter(raw)
        .filter_map(|caps| ChordToken::parse(caps.get(1)?.as_str()))
        .collect();
    most_frequent_root(&chords)
}

fn from_metadata(metadata: Option<&ChordSheetMetadata>) -> Option<DetectedKey> {
    metadata?.key_name().map(|k| DetectedKey {
        key: k.pitch_class(),
        source: KeySource::Metadata,
    })
}

/// Most common root pitch class; among equal counts the earliest-seen root wins.
pub fn most_frequent_root<'a>(chords: impl IntoIterator<Item = &'a ChordToken>) -> Option<PitchClass> {
    // (root, count) in first-occurrence order
    let mut counts: Vec<(PitchClass, usize)> = Vec::new();
    for chord in chords {
        let root = chord.root_pitch_class();
        match counts.iter_mut().find(|(pc, _)| *pc == root) {
            Some((_, n)) => *n += 1,
            None => counts.push((root, 1)),
        }
    }

    let mut best: Option<(PitchClass, usize)> = None;
    for (root, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((root, n));
        }
    }
    best.map(|(root, _)| root)
}
