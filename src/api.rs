//! # Public API
//!
//! Entry points that run the whole pipeline, and the session object that
//! backs an open chord sheet.
//!
//! ## Pipeline
//! 1. Validate raw text (advisory, logged)
//! 2. Parse into a [`ParsedSong`]
//! 3. Extract [`ChordSheetMetadata`]
//! 4. Detect the original key
//!
//! ## Typical Usage
//!
//! ```rust
//! use chordsheet::{ChordSheetSession, PitchClass, ResultCache};
//!
//! let cache = ResultCache::default();
//! let source = "{title: Amazing Grace}\n{key: G}\n[G]Amazing [C]grace";
//!
//! let mut session = ChordSheetSession::open_cached(&cache, source)?;
//! assert_eq!(session.sheet().key, Some(PitchClass::G));
//!
//! session.transpose_by(2);
//! let current = session.current()?;
//! assert_eq!(current.metadata.key.as_deref(), Some("A"));
//! # Ok::<(), chordsheet::ChordSheetError>(())
//! ```

use crate::ast::ParsedSong;
use crate::cache::ResultCache;
use crate::error::{ChordSheetError, ParseError, TransposeError};
use crate::key::detect_key;
use crate::metadata::{extract, ChordSheetMetadata};
use crate::parser::parse;
use crate::transpose::{transpose_with_spelling, TranspositionState};
use crate::validator::{validate, ValidationReport};
use crate::vocabulary::{Note, PitchClass, Spelling};
use serde::{Deserialize, Serialize};

/// Everything derived from one piece of raw content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordSheet {
    pub song: ParsedSong,
    pub metadata: ChordSheetMetadata,
    pub key: Option<PitchClass>,
    pub report: ValidationReport,
}

impl ChordSheet {
    /// Transposed copy; metadata is re-extracted so its `key` follows the shift.
    pub fn transposed(&self, semitones: i32, spelling: Spelling) -> Result<ChordSheet, TransposeError> {
        let song = transpose_with_spelling(&self.song, semitones, spelling)?;
        let metadata = extract(&song);
        Ok(ChordSheet {
            key: self.key.map(|k| k.transposed(semitones)),
            song,
            metadata,
            report: self.report.clone(),
        })
    }

    /// The original key as the sheet spells it: from the key directive when it
    /// agrees with the detected key, else from the first chord on that root.
    pub fn original_key_note(&self) -> Option<Note> {
        let key = self.key?;
        if let Some(name) = self.metadata.key_name().filter(|k| k.pitch_class() == key) {
            return Some(name.tonic);
        }
        self.song
            .chords()
            .map(|c| c.root)
            .find(|root| root.pitch_class() == key)
            .or(Some(Note::from_pitch_class(key, Spelling::Sharp)))
    }
}

/// Run validation, parsing, metadata extraction and key detection once.
///
/// # Errors
/// Returns [`ParseError`] if the content is blank or structurally malformed.
/// Validation findings never fail this call; they are in [`ChordSheet::report`].
pub fn process(raw: &str) -> Result<ChordSheet, ParseError> {
    let report = validate(raw);
    if report.has_findings() {
        tracing::warn!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Chord sheet has validation findings"
        );
    }

    let song = parse(raw)?;
    let metadata = extract(&song);
    let key = detect_key(&song, Some(&metadata));

    Ok(ChordSheet {
        song,
        metadata,
        key,
        report,
    })
}

/// Process and transpose in one call (sharp spelling).
pub fn process_transposed(raw: &str, semitones: i32) -> Result<ChordSheet, ChordSheetError> {
    let sheet = process(raw)?;
    Ok(sheet.transposed(semitones, Spelling::Sharp)?)
}

/// One open chord sheet and its transposition level.
///
/// Created when a sheet is opened and dropped when it is closed. The
/// underlying [`ChordSheet`] never changes; transposed views are computed
/// on demand from it.
#[derive(Debug, Clone)]
pub struct ChordSheetSession {
    sheet: ChordSheet,
    state: TranspositionState,
}

impl ChordSheetSession {
    pub fn open(raw: &str) -> Result<Self, ParseError> {
        Ok(Self::from_sheet(process(raw)?))
    }

    /// Open through a shared cache; spelling follows the cache's configuration.
    pub fn open_cached(cache: &ResultCache, raw: &str) -> Result<Self, ParseError> {
        let sheet = cache.get_or_process(raw)?;
        Ok(Self::from_sheet(sheet).with_spelling(cache.spelling()))
    }

    pub fn from_sheet(sheet: ChordSheet) -> Self {
        let state = TranspositionState::new(sheet.original_key_note());
        Self { sheet, state }
    }

    pub fn with_spelling(mut self, spelling: Spelling) -> Self {
        self.state = self.state.with_spelling(spelling);
        self
    }

    /// The sheet as originally written
    pub fn sheet(&self) -> &ChordSheet {
        &self.sheet
    }

    pub fn state(&self) -> &TranspositionState {
        &self.state
    }

    pub fn level(&self) -> i32 {
        self.state.level()
    }

    /// Move the level by `delta`, saturating at ±11. Returns the new level.
    pub fn transpose_by(&mut self, delta: i32) -> i32 {
        self.state.transpose_by(delta)
    }

    pub fn set_level(&mut self, level: i32) -> Result<(), TransposeError> {
        self.state.set_level(level)
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn current_key(&self) -> Option<PitchClass> {
        self.state.current_key()
    }

    pub fn current_key_name(&self) -> Option<String> {
        self.state.current_key_name()
    }

    /// The sheet at the current level
    pub fn current(&self) -> Result<ChordSheet, TransposeError> {
        if self.state.level() == 0 {
            return Ok(self.sheet.clone());
        }
        self.sheet.transposed(self.state.level(), self.state.spelling())
    }

    pub fn current_song(&self) -> Result<ParsedSong, TransposeError> {
        self.state.apply(&self.sheet.song)
    }

    pub fn current_metadata(&self) -> Result<ChordSheetMetadata, TransposeError> {
        Ok(self.current()?.metadata)
    }
}
