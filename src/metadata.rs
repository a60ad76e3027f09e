//! Metadata extraction from parsed directives.
//!
//! Recognized directives: `title`, `artist` (falling back to `subtitle`),
//! `key`, `tempo`, `time`, `capo`. Everything else, including a `subtitle`
//! that lost to `artist`, lands in [`ChordSheetMetadata::extra`].

use crate::ast::ParsedSong;
use crate::vocabulary::KeyName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const RECOGNIZED: [&str; 6] = ["title", "artist", "key", "tempo", "time", "capo"];

/// Read-only view derived from a [`ParsedSong`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChordSheetMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub key: Option<String>,
    pub tempo: Option<String>,
    pub time_signature: Option<String>,
    pub capo: Option<String>,
    /// Unrecognized directives by lower-cased name; bare directives map to `""`
    pub extra: BTreeMap<String, Vec<String>>,
}

impl ChordSheetMetadata {
    pub fn key_name(&self) -> Option<KeyName> {
        self.key.as_deref().and_then(KeyName::parse)
    }

    pub fn tempo_bpm(&self) -> Option<u32> {
        self.tempo.as_deref()?.trim().parse().ok()
    }

    pub fn capo_fret(&self) -> Option<u8> {
        self.capo.as_deref()?.trim().parse().ok()
    }
}

/// First non-empty value of directive `name`
fn value(song: &ParsedSong, name: &str) -> Option<String> {
    song.directives
        .get_all(name)
        .filter_map(|d| d.value.as_deref())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Derive metadata from a parsed song. Absent directives leave fields unset.
pub fn extract(song: &ParsedSong) -> ChordSheetMetadata {
    let artist = value(song, "artist");
    let subtitle_is_artist = artist.is_none();

    let mut extra: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for directive in &song.directives {
        let name = directive.name.as_str();
        if RECOGNIZED.contains(&name) || (name == "subtitle" && subtitle_is_artist) {
            continue;
        }
        extra
            .entry(directive.name.clone())
            .or_default()
            .push(directive.value.clone().unwrap_or_default());
    }

    ChordSheetMetadata {
        title: value(song, "title"),
        artist: artist.or_else(|| value(song, "subtitle")),
        key: value(song, "key"),
        tempo: value(song, "tempo"),
        time_signature: value(song, "time"),
        capo: value(song, "capo"),
        extra,
    }
}
