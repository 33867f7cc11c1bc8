pub mod chord;
pub mod classify;
pub mod config;
pub mod document;
pub mod error;
pub mod key;
pub mod svg;
pub mod tonnetz;
pub mod vocabulary;

pub use chord::{parse_chord, Chord};
pub use classify::{classify_line, LineKind};
pub use config::EngineConfig;
pub use document::{ChordDocument, ChordOrWord, ParsedLine, Token};
pub use error::*;
pub use key::{detect_key, detect_key_or_default, key_name, parse_key};
pub use svg::{chord_svg, render_svg, Theme};
pub use tonnetz::{DiagramStyle, LatticeLayout, LatticePoint, PixelLayout};
pub use vocabulary::{pitch_class_name, ChordType, PitchClass, Vocabulary, REFERENCE_KEY};

/// Parse a chord sheet and return it in normalized text form.
/// This is the main entry point for the library.
pub fn normalize(source: &str) -> String {
    ChordDocument::parse(source).ensure_numeric_key().0.serialize()
}

/// Normalize with a loaded configuration and an optional key change.
pub fn normalize_with_config(source: &str, config: &EngineConfig, transpose: i32) -> String {
    let doc = ChordDocument::parse_with_config(source, config);
    let (doc, _) = doc.ensure_numeric_key();
    if transpose == 0 {
        doc.serialize()
    } else {
        doc.transpose(transpose).serialize()
    }
}
