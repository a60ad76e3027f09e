//! ChordPro chord-sheet engine.
//!
//! Raw text goes through [`validate`] (advisory), [`parse`], [`extract`] and
//! [`detect_key`]; [`transpose`] shifts the result on demand and
//! [`ResultCache`] memoizes the pipeline by content hash.
//!
//! Every stage except the cache is a pure function and safe to call from any
//! thread. Content past [`EngineConfig::large_content_bytes`] (10 KB by
//! default) is worth handing to a worker thread; the engine itself never
//! blocks or spawns.

pub mod api;
pub mod ast;
pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod lexer;
pub mod metadata;
pub mod parser;
pub mod render;
pub mod transpose;
pub mod validator;
pub mod vocabulary;

pub use api::{process, process_transposed, ChordSheet, ChordSheetSession};
pub use ast::*;
pub use cache::{content_hash, CacheStats, ResultCache};
pub use config::{CacheConfig, EngineConfig};
pub use error::*;
pub use key::{detect_key, detect_key_in_raw, detect_key_with_source, DetectedKey, KeySource};
pub use metadata::{extract, ChordSheetMetadata};
pub use parser::parse;
pub use render::{ChordProRenderer, ChordsOverLyrics, Renderer};
pub use transpose::{transpose, transpose_with_spelling, TranspositionState};
pub use validator::{validate, ValidationReport};
pub use vocabulary::{is_valid_chord, is_valid_key, ChordToken, KeyName, Mode, Note, PitchClass, Spelling};
