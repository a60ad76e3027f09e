//! Integration tests for the chord-sheet engine
//!
//! Tests the full pipeline from raw ChordPro text to transposed output.

use chordsheet::{
    detect_key, extract, parse, transpose, validate, ChordProRenderer, ChordSheetSession,
    EngineConfig, ParseError, ParsedSong, PitchClass, Renderer, ResultCache, TransposeError,
};

const AMAZING_GRACE: &str = r#"{title: Amazing Grace}
{artist: John Newton}
{key: G}
{tempo: 80}
{time: 3/4}

{comment: Verse 1}
A[G]mazing [G7]grace how [C]sweet the [G]sound
That saved a [G]wretch like [D]me
I [G]once was [G7]lost but [C]now am [G]found
Was [Em]blind but [D]now I [G]see"#;

fn chord_names(song: &ParsedSong) -> Vec<String> {
    song.chords().map(|c| c.to_string()).collect()
}

#[test]
fn test_end_to_end_scenario() {
    let raw = "{title: Amazing Grace}\n{key: G}\n[G]Amazing [C]grace";

    let song = parse(raw).unwrap();
    let metadata = extract(&song);
    assert_eq!(metadata.title.as_deref(), Some("Amazing Grace"));
    assert_eq!(metadata.key.as_deref(), Some("G"));

    assert_eq!(detect_key(&song, Some(&metadata)), Some(PitchClass::G));

    let up = transpose(&song, 2).unwrap();
    assert_eq!(chord_names(&up), vec!["A", "D"]);
    assert_eq!(extract(&up).key.as_deref(), Some("A"));
}

#[test]
fn test_full_song_pipeline() {
    let report = validate(AMAZING_GRACE);
    assert!(report.is_valid);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let song = parse(AMAZING_GRACE).unwrap();
    assert_eq!(song.lines.len(), 5);
    assert_eq!(song.lines[1].lyrics(), "Amazing grace how sweet the sound");
    assert_eq!(song.lines[1].segments[0].lyric, "A");

    let metadata = extract(&song);
    assert_eq!(metadata.artist.as_deref(), Some("John Newton"));
    assert_eq!(metadata.tempo_bpm(), Some(80));
    assert_eq!(metadata.extra.get("comment"), Some(&vec!["Verse 1".to_string()]));

    let down = transpose(&song, -5).unwrap();
    assert_eq!(&chord_names(&down)[..4], &["D", "D7", "G", "D"]);
    assert_eq!(down.lyrics_text(), song.lyrics_text());
}

#[test]
fn test_key_inferred_when_no_directive() {
    let song = parse("[C]One [G]two [C]three [Am]four").unwrap();
    let metadata = extract(&song);
    assert_eq!(metadata.key, None);
    assert_eq!(detect_key(&song, Some(&metadata)), Some(PitchClass::C));
}

#[test]
fn test_validator_and_parser_agree_on_bogus_directive() {
    let report = validate("{bogus}");
    assert!(report.is_valid);
    assert_eq!(report.warnings.len(), 1);
    assert!(parse("{bogus}").is_ok());

    let report = validate("[C]Amazing [Grace");
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(parse("[C]Amazing [Grace"), Err(ParseError::Malformed { .. })));
}

#[test]
fn test_transposition_bounds() {
    let song = parse(AMAZING_GRACE).unwrap();
    for semitones in [12, -12, 100, i32::MIN] {
        assert_eq!(
            transpose(&song, semitones),
            Err(TransposeError::OutOfBounds { semitones })
        );
    }
    for semitones in [11, -11] {
        assert!(transpose(&song, semitones).is_ok());
    }
}

#[test]
fn test_zero_shift_keeps_chords() {
    let song = parse(AMAZING_GRACE).unwrap();
    let same = transpose(&song, 0).unwrap();
    let before: Vec<_> = song.chords().cloned().collect();
    let after: Vec<_> = same.chords().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn test_cache_second_call_does_not_reparse() {
    let cache = ResultCache::default();
    let (song_a, meta_a) = cache.get_or_parse(AMAZING_GRACE).unwrap();
    let (song_b, meta_b) = cache.get_or_parse(AMAZING_GRACE).unwrap();
    assert_eq!(song_a, song_b);
    assert_eq!(meta_a, meta_b);
    assert_eq!(cache.stats().parses, 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_shared_across_threads() {
    let cache = ResultCache::default();
    let sources: Vec<String> = (0..8)
        .map(|n| format!("{{title: Song {}}}\n[G]Line [C]{}", n, n))
        .collect();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for source in &sources {
                    let (song, meta) = cache.get_or_parse(source).unwrap();
                    assert_eq!(song.lines.len(), 1);
                    assert!(meta.title.unwrap().starts_with("Song "));
                }
            });
        }
    });

    assert_eq!(cache.len(), 8);
    let stats = cache.stats();
    assert_eq!(stats.parses, 8);
    assert_eq!(stats.misses, 8);
    assert_eq!(stats.hits, 24);
}

#[test]
fn test_cache_from_yaml_config() {
    let config = EngineConfig::from_yaml("cache-max-entries: 5\nspelling: flat").unwrap();
    let cache = ResultCache::new(&config);
    for n in 0..6 {
        cache.get_or_parse(&format!("[C]{}", n)).unwrap();
    }
    assert_eq!(cache.len(), 4);

    let mut session = ChordSheetSession::open_cached(&cache, "{key: C}\n[C]x [F]y").unwrap();
    session.transpose_by(1);
    let chords = chord_names(&session.current_song().unwrap());
    assert_eq!(chords, vec!["Db", "Gb"]);
}

#[test]
fn test_session_lifecycle() {
    let cache = ResultCache::default();
    let mut session = ChordSheetSession::open_cached(&cache, AMAZING_GRACE).unwrap();
    assert_eq!(session.current_key(), Some(PitchClass::G));

    for _ in 0..15 {
        session.transpose_by(1);
    }
    assert_eq!(session.level(), 11);
    assert_eq!(session.current_key(), Some(PitchClass::FSharp));

    session.reset();
    assert_eq!(session.level(), 0);
    assert_eq!(session.current_song().unwrap(), session.sheet().song);

    let _reopened = ChordSheetSession::open_cached(&cache, AMAZING_GRACE).unwrap();
    assert_eq!(cache.stats().parses, 1);
}

#[test]
fn test_render_then_parse_keeps_structure() {
    let song = parse(AMAZING_GRACE).unwrap();
    let text = ChordProRenderer.render(&song);
    let reparsed = parse(&text).unwrap();
    assert_eq!(reparsed.lines, song.lines);
    assert_eq!(reparsed.directives, song.directives);
}

#[test]
fn test_parsed_song_serializes() {
    let song = parse("{key: Bb}\n[Bbm7/F]Hal[x2]le").unwrap();
    let json = serde_json::to_string(&song).unwrap();
    assert!(json.contains("\"Bbm7/F\""));
    let back: ParsedSong = serde_json::from_str(&json).unwrap();
    assert_eq!(back, song);

    let pitch = serde_json::to_string(&PitchClass::CSharp).unwrap();
    assert_eq!(pitch, "\"C#\"");
}

#[test]
fn test_malformed_input_never_panics() {
    let inputs = [
        "[", "]", "{", "}", "[[", "{{}", "[]", "{}", "{:}", "[/]", "é[é]é", "[C/]", "{key: }",
        "[\u{1F3B8}]", "\u{0}", "[C]\n[",
    ];
    for input in inputs {
        let _ = validate(input);
        if let Ok(song) = parse(input) {
            let metadata = extract(&song);
            let _ = detect_key(&song, Some(&metadata));
            for n in -11..=11 {
                let _ = transpose(&song, n);
            }
        }
    }
}
