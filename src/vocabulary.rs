//! # Chord and Key Vocabulary
//!
//! The 12 pitch classes, note spellings, key names and the chord grammar.
//!
//! ## Chord Grammar
//! A chord token is a root (`[A-G][#b]?`) followed by any run of
//! - quality keywords: `m`, `maj`, `min`, `dim`, `aug`, `sus2`, `sus4`
//! - numeric extensions: `7`, `9`, `13`, ...
//! - added tones: `add9`, `add11`, ...
//!
//! and an optional trailing slash-bass (`/[A-G][#b]?`).
//!
//! [`ChordToken::parse`] is the only place that grammar is applied. The
//! validator, parser, key detector and transposer all go through it.
//!
//! ## Spelling
//! Arithmetic is done on [`PitchClass`] indices (sharp-spelled, C = 0).
//! Flat input (`Db`, `Eb`, `Gb`, `Ab`, `Bb`) is accepted and keeps its
//! spelling in a [`Note`], so an original key reads the way it was written.
//! Keys and chords computed by transposition use the sharp spelling unless
//! [`Spelling::Flat`] is requested.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref CHORD_PATTERN: Regex = Regex::new(
        r"^(?P<root>[A-G][#b]?)(?P<quality>(?:maj|min|dim|aug|sus2|sus4|add\d+|m|\d+)*)(?:/(?P<bass>[A-G][#b]?))?$"
    )
    .expect("chord grammar pattern is valid");
}

pub const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
pub const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// One of the 12 tones of the chromatic octave, canonically sharp-spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
}

/// Chromatic order, C = 0
pub const PITCH_CLASSES: [PitchClass; 12] = [
    PitchClass::C,
    PitchClass::CSharp,
    PitchClass::D,
    PitchClass::DSharp,
    PitchClass::E,
    PitchClass::F,
    PitchClass::FSharp,
    PitchClass::G,
    PitchClass::GSharp,
    PitchClass::A,
    PitchClass::ASharp,
    PitchClass::B,
];

impl PitchClass {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Pitch class at `index` modulo 12 (negative indices wrap).
    pub fn from_index(index: i32) -> Self {
        PITCH_CLASSES[index.rem_euclid(12) as usize]
    }

    /// Shift by `semitones`, wrapping around the octave. Any `i32` is accepted.
    pub fn transposed(self, semitones: i32) -> Self {
        Self::from_index(self.index() as i32 + semitones.rem_euclid(12))
    }

    pub fn name(self, spelling: Spelling) -> &'static str {
        match spelling {
            Spelling::Sharp => SHARP_NAMES[self.index()],
            Spelling::Flat => FLAT_NAMES[self.index()],
        }
    }

    /// Parse a bare note name such as `C`, `F#` or `Bb`.
    pub fn from_name(s: &str) -> Option<Self> {
        Note::parse(s).map(Note::pitch_class)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(Spelling::Sharp))
    }
}

/// Accidental preference for computed note names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spelling {
    #[default]
    Sharp,
    Flat,
}

/// Note letters A through G
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            _ => None,
        }
    }

    /// Semitone offset from C
    fn semitone(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }

    fn as_char(self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp, // #
    Flat,  // b
}

impl Accidental {
    fn offset(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }
}

/// A spelled note: letter plus accidental. `Db` and `C#` are different
/// notes with the same pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Note {
    pub name: NoteName,
    pub accidental: Accidental,
}

impl Note {
    /// Parse `[A-G][#b]?` exactly.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let name = NoteName::from_char(chars.next()?)?;
        let accidental = match chars.next() {
            None => return Some(Self { name, accidental: Accidental::Natural }),
            Some('#') => Accidental::Sharp,
            Some('b') => Accidental::Flat,
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(Self { name, accidental })
    }

    pub fn pitch_class(self) -> PitchClass {
        PitchClass::from_index(self.name.semitone() + self.accidental.offset())
    }

    /// Spell a pitch class with the requested accidental preference.
    pub fn from_pitch_class(pitch: PitchClass, spelling: Spelling) -> Self {
        use Accidental::*;
        let prefer_flat = spelling == Spelling::Flat;
        let (name, accidental) = match pitch {
            PitchClass::C => (NoteName::C, Natural),
            PitchClass::CSharp => if prefer_flat { (NoteName::D, Flat) } else { (NoteName::C, Sharp) },
            PitchClass::D => (NoteName::D, Natural),
            PitchClass::DSharp => if prefer_flat { (NoteName::E, Flat) } else { (NoteName::D, Sharp) },
            PitchClass::E => (NoteName::E, Natural),
            PitchClass::F => (NoteName::F, Natural),
            PitchClass::FSharp => if prefer_flat { (NoteName::G, Flat) } else { (NoteName::F, Sharp) },
            PitchClass::G => (NoteName::G, Natural),
            PitchClass::GSharp => if prefer_flat { (NoteName::A, Flat) } else { (NoteName::G, Sharp) },
            PitchClass::A => (NoteName::A, Natural),
            PitchClass::ASharp => if prefer_flat { (NoteName::B, Flat) } else { (NoteName::A, Sharp) },
            PitchClass::B => (NoteName::B, Natural),
        };
        Self { name, accidental }
    }

    pub fn transposed(self, semitones: i32, spelling: Spelling) -> Self {
        Self::from_pitch_class(self.pitch_class().transposed(semitones), spelling)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.as_char())?;
        match self.accidental {
            Accidental::Natural => Ok(()),
            Accidental::Sharp => f.write_str("#"),
            Accidental::Flat => f.write_str("b"),
        }
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.to_string()
    }
}

impl TryFrom<String> for Note {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Note::parse(&s).ok_or_else(|| format!("Invalid note name: {}", s))
    }
}

/// Mode of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// A key as written in a `{key: ...}` directive, e.g. `G`, `Em`, `Bb major`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyName {
    pub tonic: Note,
    pub mode: Mode,
}

impl KeyName {
    /// Parse a key string. Accepts a note name optionally followed by
    /// `m`/`min`/`minor` or `maj`/`major` (words are case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if !trimmed.chars().next()?.is_ascii_uppercase() {
            return None;
        }
        let tonic_len = match trimmed.as_bytes() {
            [_, b'#' | b'b', ..] => 2,
            _ => 1,
        };
        let tonic = Note::parse(&trimmed[..tonic_len])?;
        let rest = trimmed[tonic_len..].trim();
        let mode = match rest {
            "" => Mode::Major,
            "m" => Mode::Minor,
            _ => match rest.to_ascii_lowercase().as_str() {
                "maj" | "major" => Mode::Major,
                "min" | "minor" => Mode::Minor,
                _ => return None,
            },
        };
        Some(Self { tonic, mode })
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.tonic.pitch_class()
    }

    pub fn transposed(&self, semitones: i32, spelling: Spelling) -> Self {
        Self {
            tonic: self.tonic.transposed(semitones, spelling),
            mode: self.mode,
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{}", self.tonic),
            Mode::Minor => write!(f, "{}m", self.tonic),
        }
    }
}

/// A chord symbol: spelled root, opaque quality suffix and optional slash-bass.
///
/// The quality suffix (`m7`, `sus4`, `add9`, ...) is never interpreted beyond
/// checking it against the grammar.
///
/// # Examples
/// ```
/// use chordsheet::{ChordToken, PitchClass};
///
/// let chord = ChordToken::parse("Bbm7/F").unwrap();
/// assert_eq!(chord.root_pitch_class(), PitchClass::ASharp);
/// assert_eq!(chord.quality, "m7");
/// assert_eq!(chord.to_string(), "Bbm7/F");
///
/// assert!(ChordToken::parse("x2").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ChordToken {
    pub root: Note,
    pub quality: String,
    pub bass: Option<Note>,
}

impl ChordToken {
    /// Parse a chord symbol, returning `None` if it does not match the grammar.
    pub fn parse(s: &str) -> Option<Self> {
        let caps = CHORD_PATTERN.captures(s)?;
        let root = Note::parse(caps.name("root")?.as_str())?;
        let quality = caps.name("quality").map_or("", |m| m.as_str()).to_string();
        let bass = match caps.name("bass") {
            Some(m) => Some(Note::parse(m.as_str())?),
            None => None,
        };
        Some(Self { root, quality, bass })
    }

    pub fn root_pitch_class(&self) -> PitchClass {
        self.root.pitch_class()
    }

    /// True when the token, as displayed, still satisfies the chord grammar.
    pub fn is_well_formed(&self) -> bool {
        CHORD_PATTERN.is_match(&self.to_string())
    }

    /// Shift root and slash-bass independently by `semitones`; quality is kept.
    pub fn transposed(&self, semitones: i32, spelling: Spelling) -> Self {
        Self {
            root: self.root.transposed(semitones, spelling),
            quality: self.quality.clone(),
            bass: self.bass.map(|b| b.transposed(semitones, spelling)),
        }
    }
}

impl fmt::Display for ChordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.quality)?;
        if let Some(bass) = self.bass {
            write!(f, "/{}", bass)?;
        }
        Ok(())
    }
}

impl From<ChordToken> for String {
    fn from(chord: ChordToken) -> Self {
        chord.to_string()
    }
}

impl TryFrom<String> for ChordToken {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ChordToken::parse(&s).ok_or_else(|| format!("Invalid chord: {}", s))
    }
}

/// The single validity gate for chord text.
pub fn is_valid_chord(s: &str) -> bool {
    CHORD_PATTERN.is_match(s)
}

/// The single validity gate for key text.
pub fn is_valid_key(s: &str) -> bool {
    KeyName::parse(s).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class_wraps() {
        assert_eq!(PitchClass::from_index(12), PitchClass::C);
        assert_eq!(PitchClass::from_index(-1), PitchClass::B);
        assert_eq!(PitchClass::B.transposed(1), PitchClass::C);
        assert_eq!(PitchClass::C.transposed(-11), PitchClass::CSharp);
        assert_eq!(PitchClass::G.transposed(2), PitchClass::A);
    }

    #[test]
    fn test_extreme_shifts_wrap_without_overflow() {
        assert_eq!(PitchClass::B.transposed(i32::MAX), PitchClass::FSharp);
        assert_eq!(PitchClass::B.transposed(i32::MIN), PitchClass::DSharp);

        let chord = ChordToken::parse("B/D").unwrap();
        assert_eq!(chord.transposed(i32::MAX, Spelling::Sharp).to_string(), "F#/A");

        let key = KeyName::parse("Em").unwrap();
        assert_eq!(key.transposed(i32::MIN, Spelling::Sharp).to_string(), "G#m");
        assert_eq!(Note::parse("C").unwrap().transposed(i32::MIN, Spelling::Flat).to_string(), "E");
    }

    #[test]
    fn test_flat_input_normalizes_to_sharp_index() {
        assert_eq!(PitchClass::from_name("Db"), Some(PitchClass::CSharp));
        assert_eq!(PitchClass::from_name("Eb"), Some(PitchClass::DSharp));
        assert_eq!(PitchClass::from_name("Gb"), Some(PitchClass::FSharp));
        assert_eq!(PitchClass::from_name("Ab"), Some(PitchClass::GSharp));
        assert_eq!(PitchClass::from_name("Bb"), Some(PitchClass::ASharp));
        assert_eq!(PitchClass::from_name("Cb"), Some(PitchClass::B));
        assert_eq!(PitchClass::from_name("H"), None);
        assert_eq!(PitchClass::from_name("c"), None);
    }

    #[test]
    fn test_note_keeps_original_spelling() {
        let note = Note::parse("Eb").unwrap();
        assert_eq!(note.to_string(), "Eb");
        assert_eq!(note.pitch_class(), PitchClass::DSharp);
        assert_eq!(note.transposed(0, Spelling::Sharp).to_string(), "D#");
        assert_eq!(note.transposed(2, Spelling::Flat).to_string(), "F");
    }

    #[test]
    fn test_chord_grammar_accepts() {
        for chord in [
            "C", "Am", "G7", "Cmaj7", "Dm7", "F#m", "Bb", "Bbm7/F", "Csus4", "Dsus2", "Eadd9",
            "Gdim", "Caug", "C/G", "D/F#", "Amin", "G13", "C7sus4", "Ebmaj9",
        ] {
            assert!(is_valid_chord(chord), "{} should be a valid chord", chord);
        }
    }

    #[test]
    fn test_chord_grammar_rejects() {
        for text in ["", "H", "x2", "Chorus", "c", "C/", "C/H", "Cm7b5", "C#m/", "N.C.", "C G"] {
            assert!(!is_valid_chord(text), "{:?} should not be a valid chord", text);
        }
    }

    #[test]
    fn test_chord_parts() {
        let chord = ChordToken::parse("D/F#").unwrap();
        assert_eq!(chord.root.to_string(), "D");
        assert_eq!(chord.quality, "");
        assert_eq!(chord.bass.map(|b| b.pitch_class()), Some(PitchClass::FSharp));

        let chord = ChordToken::parse("Cmaj7").unwrap();
        assert_eq!(chord.quality, "maj7");
        assert_eq!(chord.bass, None);
    }

    #[test]
    fn test_chord_transposed_moves_bass_independently() {
        let chord = ChordToken::parse("Am7/G").unwrap();
        assert_eq!(chord.transposed(2, Spelling::Sharp).to_string(), "Bm7/A");
        assert_eq!(chord.transposed(-1, Spelling::Sharp).to_string(), "G#m7/F#");
        assert_eq!(chord.transposed(-1, Spelling::Flat).to_string(), "Abm7/Gb");
    }

    #[test]
    fn test_key_name_parse() {
        let key = KeyName::parse("G").unwrap();
        assert_eq!(key.mode, Mode::Major);
        assert_eq!(key.pitch_class(), PitchClass::G);

        let key = KeyName::parse(" F# minor ").unwrap();
        assert_eq!(key.mode, Mode::Minor);
        assert_eq!(key.to_string(), "F#m");

        assert_eq!(KeyName::parse("Bbm").unwrap().pitch_class(), PitchClass::ASharp);
        assert_eq!(KeyName::parse("Eb Major").unwrap().mode, Mode::Major);
        assert!(KeyName::parse("").is_none());
        assert!(KeyName::parse("X").is_none());
        assert!(KeyName::parse("Gsus").is_none());
        assert!(is_valid_key("Am"));
        assert!(!is_valid_key("A7"));
    }

    #[test]
    fn test_key_name_transposed_keeps_mode() {
        let key = KeyName::parse("Am").unwrap();
        assert_eq!(key.transposed(2, Spelling::Sharp).to_string(), "Bm");
        let key = KeyName::parse("Bb").unwrap();
        assert_eq!(key.transposed(1, Spelling::Sharp).to_string(), "B");
        assert_eq!(key.transposed(-3, Spelling::Sharp).to_string(), "G");
    }

    #[test]
    fn test_well_formed_rejects_bogus_quality() {
        let chord = ChordToken {
            root: Note::parse("C").unwrap(),
            quality: "xyz".to_string(),
            bass: None,
        };
        assert!(!chord.is_well_formed());
        assert!(ChordToken::parse("Cm7").unwrap().is_well_formed());
    }
}
