//! # Transposition
//!
//! Shifts every chord of a song by a number of semitones in -11..=11.
//!
//! - Roots and slash-basses move independently: `new = (old + n) mod 12`
//! - Quality suffixes and lyrics are untouched
//! - A `key` directive is re-spelled to the new key, so metadata extracted
//!   from the result reports the transposed key
//! - Computed notes use sharp spelling unless [`Spelling::Flat`] is requested
//!
//! Transposition is all-or-nothing: if any chord cannot be rebuilt, the
//! whole call fails and no partially shifted song is returned.
//!
//! The bound applies to a single call. Accumulating shifts across user
//! clicks is [`TranspositionState`]'s job.

use crate::ast::ParsedSong;
use crate::error::TransposeError;
use crate::vocabulary::{ChordToken, KeyName, Note, PitchClass, Spelling};
use serde::{Deserialize, Serialize};

pub const MAX_SEMITONES: i32 = 11;

fn check_bounds(semitones: i32) -> Result<(), TransposeError> {
    if (-MAX_SEMITONES..=MAX_SEMITONES).contains(&semitones) {
        Ok(())
    } else {
        Err(TransposeError::OutOfBounds { semitones })
    }
}

/// Transpose with sharp spelling
///
/// # Example
/// ```
/// use chordsheet::{parse, transpose};
///
/// let song = parse("{key: G}\n[G]Amazing [C]grace").unwrap();
/// let up = transpose(&song, 2).unwrap();
/// let chords: Vec<String> = up.chords().map(|c| c.to_string()).collect();
/// assert_eq!(chords, vec!["A", "D"]);
/// assert_eq!(up.directives.get("key"), Some("A"));
///
/// assert!(transpose(&song, 12).is_err());
/// ```
pub fn transpose(song: &ParsedSong, semitones: i32) -> Result<ParsedSong, TransposeError> {
    transpose_with_spelling(song, semitones, Spelling::Sharp)
}

pub fn transpose_with_spelling(
    song: &ParsedSong,
    semitones: i32,
    spelling: Spelling,
) -> Result<ParsedSong, TransposeError> {
    check_bounds(semitones)?;

    if semitones == 0 {
        return Ok(song.clone());
    }

    let mut result = song.clone();

    for line in &mut result.lines {
        for segment in &mut line.segments {
            if let Some(chord) = &segment.chord {
                segment.chord = Some(transpose_chord(chord, semitones, spelling)?);
            }
        }
    }

    for directive in result.directives.iter_mut().filter(|d| d.name == "key") {
        let Some(value) = directive.value.clone() else { continue };
        match KeyName::parse(&value) {
            Some(key) => directive.value = Some(key.transposed(semitones, spelling).to_string()),
            None => tracing::warn!(key = %value, "Key directive is not a valid key; left unchanged"),
        }
    }

    Ok(result)
}

fn transpose_chord(
    chord: &ChordToken,
    semitones: i32,
    spelling: Spelling,
) -> Result<ChordToken, TransposeError> {
    let invalid = || TransposeError::InvalidChord {
        token: chord.to_string(),
    };
    if !chord.is_well_formed() {
        return Err(invalid());
    }
    let shifted = chord.transposed(semitones, spelling);
    ChordToken::parse(&shifted.to_string()).ok_or_else(invalid)
}

/// Per-session transposition level of one open chord sheet
///
/// ```
/// use chordsheet::{Note, PitchClass, TranspositionState};
///
/// let mut state = TranspositionState::new(Note::parse("Bb"));
/// assert_eq!(state.current_key_name().as_deref(), Some("Bb"));
///
/// state.transpose_by(3);
/// assert_eq!(state.current_key(), Some(PitchClass::CSharp));
///
/// state.transpose_by(20);
/// assert_eq!(state.level(), 11);
///
/// state.reset();
/// assert_eq!(state.level(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranspositionState {
    original: Option<Note>,
    level: i32,
    spelling: Spelling,
}

impl TranspositionState {
    /// Start at level 0 for a sheet whose original key is `original`, as spelled
    pub fn new(original: Option<Note>) -> Self {
        Self {
            original,
            level: 0,
            spelling: Spelling::Sharp,
        }
    }

    pub fn with_spelling(mut self, spelling: Spelling) -> Self {
        self.spelling = spelling;
        self
    }

    pub fn original_key(&self) -> Option<PitchClass> {
        self.original.map(Note::pitch_class)
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn spelling(&self) -> Spelling {
        self.spelling
    }

    /// `original_key` shifted by the current level
    pub fn current_key(&self) -> Option<PitchClass> {
        self.original_key().map(|k| k.transposed(self.level))
    }

    /// The original spelling at level 0, otherwise the computed spelling
    pub fn current_key_name(&self) -> Option<String> {
        let original = self.original?;
        if self.level == 0 {
            return Some(original.to_string());
        }
        Some(original.transposed(self.level, self.spelling).to_string())
    }

    /// Add `delta` to the level, saturating at -11 and 11. Returns the new level.
    pub fn transpose_by(&mut self, delta: i32) -> i32 {
        self.level = self
            .level
            .saturating_add(delta)
            .clamp(-MAX_SEMITONES, MAX_SEMITONES);
        self.level
    }

    /// Jump to an absolute level; out-of-range levels leave the state unchanged.
    pub fn set_level(&mut self, level: i32) -> Result<(), TransposeError> {
        check_bounds(level)?;
        self.level = level;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.level = 0;
    }

    /// Transpose `song` to the current level
    pub fn apply(&self, song: &ParsedSong) -> Result<ParsedSong, TransposeError> {
        transpose_with_spelling(song, self.level, self.spelling)
    }
}
