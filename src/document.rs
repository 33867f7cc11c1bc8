//! # Chord Documents
//!
//! Parses a chord sheet (metadata block + chord/lyric body) into a
//! [`ChordDocument`], canonicalizes its chords to the reference key, and
//! serializes it back to text.
//!
//! ## Text Format
//! ```text
//! Title: Let It Be
//! Artist: The Beatles
//! Key: C
//!
//! [Verse]
//! C         G          Am   F
//! When I find myself in times of trouble
//! ```
//!
//! - Leading `Field: value` lines (blank lines allowed in between) form the
//!   metadata block. It ends at the first non-blank line without a colon
//!   after its first character.
//! - Without a `Title` field, the first body line is consumed as the title,
//!   or the configured default title is used when there is no body.
//! - Each body line is classified as blank, section marker, chord line or
//!   lyric line.
//!
//! ## Canonical Storage
//! After parsing, every chord root is shifted so that the detected key of
//! the document becomes the reference key (C = 4). `detected_key` keeps the
//! key found before the shift; `specified_key` is the declared `Key:` value
//! (falling back to the detected key) and is informational only.
//!
//! Serialization writes the *original* text of every body line, so chord
//! text in the file is never rewritten. Transposition only changes the
//! numeric `Key` metadata value; collaborators derive displayed chords from
//! the canonical chords plus that key via [`ChordDocument::display_chord`].
//!
//! ## Example
//! ```rust
//! use tonnetz::ChordDocument;
//!
//! let doc = ChordDocument::parse("Title: Test\nKey: G\n\nG C D Em\nHello world");
//! assert_eq!(doc.detected_key, 5);
//! assert_eq!(doc.specified_key, 5);
//! assert_eq!(doc.chords().next().unwrap().to_string(), "C"); // stored in C
//!
//! let up = doc.transpose(2);
//! assert_eq!(up.metadata_value("key"), Some("7"));
//! assert!(up.serialize().contains("G C D Em"));
//! ```

use crate::chord::Chord;
use crate::classify::LineKind;
use crate::config::EngineConfig;
use crate::key::detect_key;
use crate::vocabulary::{PitchClass, Vocabulary, REFERENCE_KEY};
use serde::Serialize;
use tracing::debug;

/// Content of one token on a chord line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Token<'v> {
    Chord(Chord<'v>),
    /// Token that is not a chord, kept verbatim (`|`, `.`, `(x2)`, ...).
    Word(String),
}

/// A token on a chord line with its starting character column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordOrWord<'v> {
    pub content: Token<'v>,
    pub position: usize,
    /// `mk-{body line}-{column}`, links the chord to the lyric column below.
    pub marker_id: String,
}

impl<'v> ChordOrWord<'v> {
    pub fn chord(&self) -> Option<&Chord<'v>> {
        match &self.content {
            Token::Chord(chord) => Some(chord),
            Token::Word(_) => None,
        }
    }
}

/// One line of a parsed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParsedLine<'v> {
    Empty {
        content: String,
    },
    /// Top-level heading. Not produced by the parser; editors may insert
    /// one, and it serializes like any other body line.
    Heading {
        content: String,
    },
    Subheading {
        content: String,
    },
    Chords {
        content: String,
        max_chord_position: usize,
        chords_or_words: Vec<ChordOrWord<'v>>,
    },
    Lyrics {
        content: String,
    },
    Metadata {
        field: String,
        value: String,
    },
    /// Separator between the metadata block and the body.
    Spacer,
}

impl ParsedLine<'_> {
    /// Original text of a body line; metadata values for metadata lines.
    pub fn content(&self) -> &str {
        match self {
            ParsedLine::Empty { content }
            | ParsedLine::Heading { content }
            | ParsedLine::Subheading { content }
            | ParsedLine::Chords { content, .. }
            | ParsedLine::Lyrics { content } => content,
            ParsedLine::Metadata { value, .. } => value,
            ParsedLine::Spacer => "",
        }
    }

    fn is_field(&self, name: &str) -> bool {
        matches!(self, ParsedLine::Metadata { field, .. } if field.eq_ignore_ascii_case(name))
    }
}

/// A parsed chord sheet.
#[derive(Debug, Clone, Serialize)]
pub struct ChordDocument<'v> {
    #[serde(skip)]
    vocabulary: &'v Vocabulary,
    /// Declared `Key:` value, or the detected key when absent/invalid.
    pub specified_key: PitchClass,
    /// Key detected from the chords before canonicalization.
    pub detected_key: PitchClass,
    pub lines: Vec<ParsedLine<'v>>,
}

impl ChordDocument<'static> {
    /// Parse with the built-in vocabulary and default configuration.
    pub fn parse(content: &str) -> Self {
        Self::parse_with_config(content, &EngineConfig::default())
    }

    pub fn parse_with_config(content: &str, config: &EngineConfig) -> Self {
        Vocabulary::builtin().parse_document(content, config)
    }
}

impl Vocabulary {
    /// Parse a chord sheet against this vocabulary.
    pub fn parse_document(&self, content: &str, config: &EngineConfig) -> ChordDocument<'_> {
        let source_lines: Vec<&str> = content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();

        let header = extract_metadata(&source_lines, &config.default_title);
        let mut lines = header.lines;
        lines.push(ParsedLine::Spacer);

        for (index, line) in source_lines[header.body_start..].iter().enumerate() {
            let parsed = match self.classify_line(line, config.chord_line_threshold) {
                LineKind::Empty => ParsedLine::Empty {
                    content: line.to_string(),
                },
                LineKind::Subheading => ParsedLine::Subheading {
                    content: line.to_string(),
                },
                LineKind::Lyrics => ParsedLine::Lyrics {
                    content: line.to_string(),
                },
                LineKind::Chords => self.parse_chord_line(line, index),
            };
            lines.push(parsed);
        }

        let all_chords: Vec<Chord<'_>> = lines
            .iter()
            .flat_map(line_chords)
            .copied()
            .collect();
        let detected_key = detect_key(&all_chords).unwrap_or(config.fallback_key);

        let offset = (12 + REFERENCE_KEY as i32 - detected_key as i32) % 12;
        for line in &mut lines {
            if let ParsedLine::Chords {
                chords_or_words, ..
            } = line
            {
                for item in chords_or_words.iter_mut() {
                    if let Token::Chord(chord) = &mut item.content {
                        *chord = chord.shifted(offset);
                    }
                }
            }
        }

        let specified_key = header
            .key
            .as_deref()
            .and_then(|k| self.parse_key(k))
            .unwrap_or(detected_key);

        debug!(
            lines = lines.len(),
            chords = all_chords.len(),
            detected_key,
            specified_key,
            offset,
            "parsed chord document"
        );

        ChordDocument {
            vocabulary: self,
            specified_key,
            detected_key,
            lines,
        }
    }

    fn parse_chord_line<'v>(&'v self, line: &str, index: usize) -> ParsedLine<'v> {
        let mut chords_or_words = Vec::new();
        let mut max_chord_position = 0;
        let mut position = 0;

        for token in line.split(' ') {
            if token.is_empty() {
                position += 1;
                continue;
            }
            let content = match self.parse_chord(token) {
                Some(chord) => {
                    max_chord_position = max_chord_position.max(position);
                    Token::Chord(chord)
                }
                None => Token::Word(token.to_string()),
            };
            chords_or_words.push(ChordOrWord {
                content,
                position,
                marker_id: format!("mk-{}-{}", index, position),
            });
            position += token.chars().count() + 1;
        }

        ParsedLine::Chords {
            content: line.to_string(),
            max_chord_position,
            chords_or_words,
        }
    }
}

fn line_chords<'a, 'v>(line: &'a ParsedLine<'v>) -> impl Iterator<Item = &'a Chord<'v>> {
    let items: &'a [ChordOrWord<'v>] = match line {
        ParsedLine::Chords {
            chords_or_words, ..
        } => chords_or_words,
        _ => &[],
    };
    items.iter().filter_map(ChordOrWord::chord)
}

fn metadata_pair<'a>(line: &'a ParsedLine<'_>) -> Option<(&'a str, &'a str)> {
    match line {
        ParsedLine::Metadata { field, value } => Some((field.as_str(), value.as_str())),
        _ => None,
    }
}

struct Header<'v> {
    lines: Vec<ParsedLine<'v>>,
    key: Option<String>,
    body_start: usize,
}

/// Split the leading metadata block off the source lines.
fn extract_metadata<'v>(lines: &[&str], default_title: &str) -> Header<'v> {
    let mut metadata = Vec::new();
    let mut key = None;
    let mut has_title = false;
    let mut first_body_line = None;
    let mut body_start = 0;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            body_start = i + 1;
            continue;
        }

        match trimmed.find(':') {
            Some(colon) if colon > 0 => {
                let field = trimmed[..colon].trim();
                let value = trimmed[colon + 1..].trim();
                if field.eq_ignore_ascii_case("title") {
                    has_title = true;
                } else if field.eq_ignore_ascii_case("key") {
                    key = Some(value.to_string());
                }
                metadata.push(ParsedLine::Metadata {
                    field: field.to_string(),
                    value: value.to_string(),
                });
                body_start = i + 1;
            }
            _ => {
                first_body_line = Some(i);
                break;
            }
        }
    }

    if !has_title {
        let title = match first_body_line {
            Some(i) => {
                body_start = i + 1;
                lines[i].trim()
            }
            None => default_title,
        };
        metadata.insert(
            0,
            ParsedLine::Metadata {
                field: "Title".to_string(),
                value: title.to_string(),
            },
        );
    }

    Header {
        lines: metadata,
        key,
        body_start: body_start.min(lines.len()),
    }
}

/// Key value that is already a plain integer 0-11.
fn numeric_key(value: &str) -> Option<PitchClass> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse::<u8>().ok().filter(|n| *n <= 11)
}

fn capitalize_field(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl<'v> ChordDocument<'v> {
    /// Render the document back to text.
    ///
    /// Metadata field names are capitalized and a parseable `Key` is written
    /// in numeric form. Body lines are written exactly as they were read.
    pub fn serialize(&self) -> String {
        let mut out: Vec<String> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match line {
                ParsedLine::Metadata { field, value } => {
                    let name = capitalize_field(field);
                    let value = if field.eq_ignore_ascii_case("key") {
                        self.vocabulary
                            .parse_key(value)
                            .map(|k| k.to_string())
                            .unwrap_or_else(|| value.clone())
                    } else {
                        value.clone()
                    };
                    out.push(format!("{}: {}", name, value));
                }
                ParsedLine::Empty { .. } | ParsedLine::Spacer => out.push(String::new()),
                other => out.push(other.content().to_string()),
            }
        }
        out.join("\n")
    }

    /// Ordered `(field, value)` pairs of the metadata block.
    pub fn metadata<'s>(&'s self) -> impl Iterator<Item = (&'s str, &'s str)> + 's {
        let lines: &'s [ParsedLine<'s>] = &self.lines;
        lines.iter().filter_map(metadata_pair)
    }

    /// Case-insensitive metadata lookup.
    pub fn metadata_value(&self, field: &str) -> Option<&str> {
        self.metadata()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
            .map(|(_, value)| value)
    }

    pub fn title(&self) -> &str {
        self.metadata_value("title").unwrap_or("")
    }

    /// Every parsed chord, in canonical (reference-key) form.
    pub fn chords(&self) -> impl Iterator<Item = &Chord<'v>> {
        self.lines.iter().flat_map(line_chords)
    }

    /// Key the document is displayed in: the `Key` metadata value when it
    /// parses, otherwise the specified key.
    pub fn key_number(&self) -> PitchClass {
        self.metadata_value("key")
            .and_then(|k| self.vocabulary.parse_key(k))
            .unwrap_or(self.specified_key)
    }

    /// A canonical chord moved into the displayed key.
    pub fn display_chord(&self, chord: &Chord<'v>) -> Chord<'v> {
        chord.shifted(self.key_number() as i32 - REFERENCE_KEY as i32)
    }

    /// Copy of this document whose `Key` metadata is a plain number 0-11.
    ///
    /// An existing numeric key is kept. Otherwise the specified key is
    /// written, inserting a `Key` field after `Title` if there is none.
    pub fn ensure_numeric_key(&self) -> (ChordDocument<'v>, PitchClass) {
        let mut doc = self.clone();
        let key_index = doc.lines.iter().position(|l| l.is_field("key"));

        if let Some(key) = key_index.and_then(|i| numeric_key(doc.lines[i].content())) {
            return (doc, key);
        }

        let key = self.specified_key;
        match key_index {
            Some(i) => doc.set_metadata_value(i, key),
            None => {
                let at = doc
                    .lines
                    .iter()
                    .position(|l| l.is_field("title"))
                    .map(|i| i + 1)
                    .unwrap_or(0);
                doc.lines.insert(
                    at,
                    ParsedLine::Metadata {
                        field: "Key".to_string(),
                        value: key.to_string(),
                    },
                );
            }
        }
        (doc, key)
    }

    /// Copy of this document with the `Key` metadata moved by `semitones`.
    ///
    /// Chord text and canonical chords are left untouched.
    pub fn transpose(&self, semitones: i32) -> ChordDocument<'v> {
        let (mut doc, current) = self.ensure_numeric_key();
        let new_key = (current as i32 + semitones.rem_euclid(12)).rem_euclid(12) as PitchClass;
        if let Some(i) = doc.lines.iter().position(|l| l.is_field("key")) {
            doc.set_metadata_value(i, new_key);
        }
        doc
    }

    fn set_metadata_value(&mut self, index: usize, key: PitchClass) {
        if let ParsedLine::Metadata { value, .. } = &mut self.lines[index] {
            *value = key.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIMPLE: &str = "Title: Test\nKey: C\n\nAm F C G\nHello world";

    fn body<'a, 'v>(doc: &'a ChordDocument<'v>) -> Vec<&'a ParsedLine<'v>> {
        doc.lines
            .iter()
            .skip_while(|l| !matches!(l, ParsedLine::Spacer))
            .skip(1)
            .collect()
    }

    #[test]
    fn test_simple_document() {
        let doc = ChordDocument::parse(SIMPLE);
        assert_eq!(doc.specified_key, 4);
        assert_eq!(doc.detected_key, 4);
        assert_eq!(doc.title(), "Test");

        let body = body(&doc);
        assert_eq!(body.len(), 2);
        match body[0] {
            ParsedLine::Chords {
                chords_or_words, ..
            } => {
                assert_eq!(chords_or_words.len(), 4);
                assert!(chords_or_words.iter().all(|c| c.chord().is_some()));
            }
            other => panic!("expected chord line, got {:?}", other),
        }
        assert!(matches!(body[1], ParsedLine::Lyrics { .. }));
    }

    #[test]
    fn test_canonicalizes_to_reference_key() {
        let doc = ChordDocument::parse("Title: Song\n\nG C D Em\n");
        assert_eq!(doc.detected_key, 5);
        assert_eq!(doc.specified_key, 5);
        let roots: Vec<String> = doc.chords().map(|c| c.to_string()).collect();
        assert_eq!(roots, vec!["C", "F", "G", "Am"]);
    }

    #[test]
    fn test_specified_key_is_informational() {
        let doc = ChordDocument::parse("Title: Song\nKey: Bb\n\nG C D Em");
        assert_eq!(doc.specified_key, 2);
        assert_eq!(doc.detected_key, 5);
        // Chords still canonicalized from the detected key
        assert_eq!(doc.chords().next().unwrap().root, 4);
    }

    #[test]
    fn test_chord_columns() {
        let doc = ChordDocument::parse("Title: T\n\nC    G/B  Am  (x2)");
        let items = match body(&doc)[0] {
            ParsedLine::Chords {
                chords_or_words,
                max_chord_position,
                ..
            } => {
                assert_eq!(*max_chord_position, 10);
                chords_or_words.clone()
            }
            other => panic!("expected chord line, got {:?}", other),
        };
        let positions: Vec<usize> = items.iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![0, 5, 10, 14]);
        assert_eq!(items[3].content, Token::Word("(x2)".to_string()));
        assert_eq!(items[1].marker_id, "mk-0-5");
    }

    #[test]
    fn test_title_from_first_line() {
        let doc = ChordDocument::parse("My Song\n\nC F G C");
        assert_eq!(doc.title(), "My Song");
        assert_eq!(doc.chords().count(), 4);
    }

    #[test]
    fn test_default_title() {
        let config = EngineConfig {
            default_title: "Untitled".to_string(),
            ..EngineConfig::default()
        };
        let doc = ChordDocument::parse_with_config("Artist: Nobody", &config);
        assert_eq!(doc.title(), "Untitled");
        assert_eq!(doc.metadata_value("artist"), Some("Nobody"));
    }

    #[test]
    fn test_no_chords_uses_fallback_key() {
        let doc = ChordDocument::parse("Title: Poem\n\nRoses are red\nviolets are blue");
        assert_eq!(doc.detected_key, 4);
        assert_eq!(doc.specified_key, 4);

        let config = EngineConfig {
            fallback_key: 9,
            ..EngineConfig::default()
        };
        let doc = ChordDocument::parse_with_config("Title: Poem\n\nRoses are red", &config);
        assert_eq!(doc.detected_key, 9);
    }

    #[test]
    fn test_colon_in_body_is_content() {
        let doc = ChordDocument::parse("Title: T\n\nC G\nNote: this is a lyric");
        assert_eq!(doc.metadata().count(), 1);
        assert!(matches!(body(&doc)[1], ParsedLine::Lyrics { .. }));
    }

    #[test]
    fn test_unknown_fields_preserved_in_order() {
        let doc = ChordDocument::parse("Title: T\nCapo: 2\nartist: Someone\nBPM: 96\n\nC");
        let fields: Vec<(&str, &str)> = doc.metadata().collect();
        assert_eq!(
            fields,
            vec![("Title", "T"), ("Capo", "2"), ("artist", "Someone"), ("BPM", "96")]
        );
        let text = doc.serialize();
        assert!(text.starts_with("Title: T\nCapo: 2\nArtist: Someone\nBPM: 96\n\nC"));
    }

    #[test]
    fn test_serialize_keeps_original_chord_text() {
        let doc = ChordDocument::parse("Title: Song\nKey: G\n\n[Verse]\nG   C D Em\nla la");
        assert_eq!(
            doc.serialize(),
            "Title: Song\nKey: 5\n\n[Verse]\nG   C D Em\nla la"
        );
    }

    #[test]
    fn test_serialize_keeps_unparseable_key() {
        let doc = ChordDocument::parse("Title: Song\nKey: whatever\n\nC");
        assert!(doc.serialize().contains("Key: whatever"));
    }

    #[test]
    fn test_serialize_is_stable() {
        let once = ChordDocument::parse(SIMPLE).serialize();
        let twice = ChordDocument::parse(&once).serialize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ensure_numeric_key_inserts_after_title() {
        let doc = ChordDocument::parse("Title: Song\nArtist: Me\n\nG C D");
        let (doc, key) = doc.ensure_numeric_key();
        assert_eq!(key, 5);
        let fields: Vec<&str> = doc.metadata().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["Title", "Key", "Artist"]);
    }

    #[test]
    fn test_ensure_numeric_key_keeps_numeric() {
        let doc = ChordDocument::parse("Title: Song\nKey: 9\n\nG C D");
        let (doc, key) = doc.ensure_numeric_key();
        assert_eq!(key, 9);
        assert_eq!(doc.metadata_value("key"), Some("9"));
    }

    #[test]
    fn test_transpose_only_touches_key() {
        let doc = ChordDocument::parse("Title: Song\nKey: C\n\nC F G");
        let up = doc.transpose(3);
        assert_eq!(up.metadata_value("key"), Some("7"));
        assert_eq!(up.key_number(), 7);
        assert!(up.serialize().ends_with("C F G"));
        let roots: Vec<u8> = up.chords().map(|c| c.root).collect();
        let original: Vec<u8> = doc.chords().map(|c| c.root).collect();
        assert_eq!(roots, original);
        // Source document unchanged
        assert_eq!(doc.metadata_value("key"), Some("C"));
    }

    #[test]
    fn test_transpose_inverse() {
        let doc = ChordDocument::parse("Title: Song\nKey: D\n\nD G A");
        for n in -25..25 {
            let back = doc.transpose(n).transpose((-n).rem_euclid(12));
            assert_eq!(back.key_number(), doc.key_number(), "n = {}", n);
        }
    }

    #[test]
    fn test_transpose_extreme_offsets() {
        let doc = ChordDocument::parse("Title: Song\nKey: 11\n\nC F G");
        // i32::MAX = 7 (mod 12), i32::MIN = 4 (mod 12)
        assert_eq!(doc.transpose(i32::MAX).key_number(), 6);
        assert_eq!(doc.transpose(i32::MIN).key_number(), 3);
        assert_eq!(doc.transpose(i32::MAX).transpose(5).key_number(), 11);
    }

    #[test]
    fn test_metadata_block_spans_blank_lines() {
        let doc = ChordDocument::parse("Title: T\n\nArtist: X\n\nC G Am F");
        let fields: Vec<(&str, &str)> = doc.metadata().collect();
        assert_eq!(fields, vec![("Title", "T"), ("Artist", "X")]);
        assert_eq!(doc.chords().count(), 4);
        assert_eq!(doc.serialize(), "Title: T\nArtist: X\n\nC G Am F");
    }

    #[test]
    fn test_leading_colon_ends_metadata() {
        let doc = ChordDocument::parse("Title: T\n: foo\nArtist: X");
        let fields: Vec<(&str, &str)> = doc.metadata().collect();
        assert_eq!(fields, vec![("Title", "T")]);
        let body = body(&doc);
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].content(), ": foo");
        // Past the block a colon line is ordinary content
        assert_eq!(body[1].content(), "Artist: X");
        assert!(matches!(body[1], ParsedLine::Lyrics { .. }));
    }

    #[test]
    fn test_display_chord_follows_key() {
        let doc = ChordDocument::parse("Title: Song\n\nG C D Em");
        let first = *doc.chords().next().unwrap();
        assert_eq!(doc.display_chord(&first).to_string(), "G");
        let moved = doc.transpose(1);
        assert_eq!(moved.display_chord(&first).to_string(), "D");
    }

    #[test]
    fn test_crlf_input() {
        let doc = ChordDocument::parse("Title: T\r\nKey: C\r\n\r\nC G\r\nwords here\r\n");
        assert_eq!(doc.specified_key, 4);
        assert_eq!(doc.chords().count(), 2);
    }
}
