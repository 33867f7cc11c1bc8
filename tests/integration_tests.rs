//! Integration tests for the tonnetz engine
//!
//! Tests the full pipeline from chord sheet text to normalized text,
//! JSON and SVG diagrams.

use pretty_assertions::assert_eq;
use tonnetz::{
    chord_svg, classify_line, detect_key, normalize, normalize_with_config, parse_chord, ChordDocument,
    DiagramStyle, EngineConfig, LineKind, ParsedLine, Theme, Vocabulary,
};

#[test]
fn test_parse_simple_document() {
    let source = "Title: Test\nKey: C\n\nAm F C G\nHello world";
    let doc = ChordDocument::parse(source);

    assert_eq!(doc.specified_key, 4);
    let expected: Vec<_> = ["Am", "F", "C", "G"].iter().filter_map(|t| parse_chord(t)).collect();
    assert_eq!(detect_key(&expected), Some(doc.detected_key));

    let chord_lines: Vec<&ParsedLine> = doc
        .lines
        .iter()
        .filter(|l| matches!(l, ParsedLine::Chords { .. }))
        .collect();
    assert_eq!(chord_lines.len(), 1);
    assert_eq!(doc.chords().count(), 4);
    assert_eq!(
        doc.lines
            .iter()
            .filter(|l| matches!(l, ParsedLine::Lyrics { .. }))
            .count(),
        1
    );
}

#[test]
fn test_classification_examples() {
    assert_eq!(classify_line("Am F C G"), LineKind::Chords);
    assert_eq!(classify_line("Hello there friend"), LineKind::Lyrics);
    assert_eq!(classify_line("[Chorus]"), LineKind::Subheading);
    assert_eq!(classify_line(""), LineKind::Empty);
}

#[test]
fn test_normalize_document() {
    let source = r#"Title: Wonderwall
Artist: Oasis
Key: F# minor

[Intro]
Em7   G   Dsus4   A7sus4
Today is gonna be the day
"#;
    let normalized = normalize(source);
    assert_eq!(
        normalized,
        "Title: Wonderwall\nArtist: Oasis\nKey: 7\n\n[Intro]\nEm7   G   Dsus4   A7sus4\nToday is gonna be the day\n"
    );
}

#[test]
fn test_normalize_with_transpose() {
    let source = "Title: Song\nKey: G\n\nG C D\n";
    let config = EngineConfig::default();
    let up = normalize_with_config(source, &config, 2);
    assert!(up.contains("Key: 7"));
    assert!(up.contains("G C D"));

    let down = normalize_with_config(source, &config, -7);
    assert!(down.contains("Key: 10"));
}

#[test]
fn test_document_round_trip() {
    let source = "Title: Song\nKey: 5\n\n[Verse]\nG    D/F#   Em\nsome words here\n\n[Chorus]\nC  G";
    let first = ChordDocument::parse(source).serialize();
    assert_eq!(first, source);
    assert_eq!(ChordDocument::parse(&first).serialize(), first);
}

#[test]
fn test_document_to_json() {
    let doc = ChordDocument::parse("Title: Test\n\nC G/B\nla");
    let json = serde_json::to_value(&doc).unwrap();

    // C and G: the G chord's extra weight tips it to G major
    assert_eq!(json["detected_key"], 5);
    let lines = json["lines"].as_array().unwrap();
    assert_eq!(lines[0]["type"], "metadata");
    assert_eq!(lines[1]["type"], "spacer");
    assert_eq!(lines[2]["type"], "chords");

    let second = &lines[2]["chords_or_words"][1];
    assert_eq!(second["position"], 2);
    assert_eq!(second["marker_id"], "mk-0-2");
    assert_eq!(second["content"]["chord"]["type"]["name"], "major");
    assert_eq!(second["content"]["chord"]["bass"], 4);
}

#[test]
fn test_diagrams_for_document_chords() {
    let doc = ChordDocument::parse("Title: Song\nKey: D\n\nD G A Bm");
    for chord in doc.chords() {
        let shown = doc.display_chord(chord);
        let svg = chord_svg(&shown, DiagramStyle::Absolute, Theme::Dark);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.matches("<circle").count() >= 6 + 3);
    }

    let names: Vec<String> = doc.chords().map(|c| doc.display_chord(c).to_string()).collect();
    assert_eq!(names, vec!["D", "G", "A", "Bm"]);
}

#[test]
fn test_custom_vocabulary() {
    let table = r#"
notes:
  - { name: C, pitch_class: 4 }
  - { name: G, pitch_class: 5 }
  - { name: H, pitch_class: 9 }
  - { name: A, pitch_class: 7 }
chords:
  - { name: major, aliases: ["", "Dur"], intervals: [0, 4, 7] }
  - { name: minor, aliases: ["m", "moll"], intervals: [0, 3, 7] }
"#;
    let vocab = Vocabulary::from_yaml(table).unwrap();
    let chord = vocab.parse_chord("Hmoll").unwrap();
    assert_eq!(chord.root, 9);
    assert_eq!(chord.chord_type.name, "minor");

    let doc = vocab.parse_document("Title: Lied\n\nC G Amoll C", &EngineConfig::default());
    assert_eq!(doc.chords().count(), 4);
    assert_eq!(doc.detected_key, 4);
}

#[test]
fn test_config_changes_parsing() {
    let config = EngineConfig::from_yaml("chord-line-threshold: 0.9\ndefault-title: Untitled").unwrap();
    // Half the words are chords: a chord line by default, lyrics at 0.9
    let source = "Title: Mixed\n\nC and G here";

    let doc = ChordDocument::parse(source);
    assert!(matches!(doc.lines.last(), Some(ParsedLine::Chords { .. })));
    assert_eq!(doc.chords().count(), 2);

    let doc = ChordDocument::parse_with_config(source, &config);
    assert!(matches!(doc.lines.last(), Some(ParsedLine::Lyrics { .. })));
    assert_eq!(doc.chords().count(), 0);

    let doc = ChordDocument::parse_with_config("Key: C", &config);
    assert_eq!(doc.title(), "Untitled");
}
