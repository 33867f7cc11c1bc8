//! # Chord Symbol Parsing
//!
//! Parses chord tokens such as `C`, `F#m7`, `Bbmaj7` or `G/B` into [`Chord`]
//! values using a [`Vocabulary`].
//!
//! ## Token Grammar
//! ```text
//! <root><suffix>[/<bass>]
//! ```
//! - `<root>`: longest matching note spelling (`C#` wins over `C`)
//! - `<suffix>`: must equal one alias of a chord type exactly (`""` is major)
//! - `<bass>`: optional note spelling; an unknown bass is ignored
//!
//! Parsing doubles as the oracle for line classification, so a failed parse
//! is `None` rather than an error and has no side effects.
//!
//! ## Example
//! ```rust
//! use tonnetz::parse_chord;
//!
//! let chord = parse_chord("Gm7/Bb").unwrap();
//! assert_eq!(chord.root, 5);
//! assert_eq!(chord.chord_type.name, "minor7");
//! assert_eq!(chord.to_string(), "Gm7/Bb");
//! ```

use crate::vocabulary::{pitch_class_name, ChordType, PitchClass, Vocabulary};
use serde::Serialize;
use std::fmt;

/// A parsed chord.
///
/// `bass` is an interval from the root in the same units as
/// [`ChordType::intervals`]; 0 means no inversion is marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chord<'v> {
    pub root: PitchClass,
    #[serde(rename = "type")]
    pub chord_type: &'v ChordType,
    pub bass: i32,
}

impl<'v> Chord<'v> {
    /// Stable identifier, e.g. `"4-major-0"`.
    pub fn id(&self) -> String {
        format!("{}-{}-{}", self.root, self.chord_type.name, self.bass)
    }

    /// Pitch class of the bass note.
    pub fn bass_pitch_class(&self) -> PitchClass {
        tone(self.root, self.bass)
    }

    /// Pitch class of every chord tone, in interval order.
    pub fn pitch_classes(&self) -> Vec<PitchClass> {
        self.chord_type
            .intervals
            .iter()
            .map(|&interval| tone(self.root, interval))
            .collect()
    }

    /// The same chord with its root moved by `offset` positions.
    pub fn shifted(&self, offset: i32) -> Self {
        Self {
            root: (self.root as i32 + offset.rem_euclid(12)).rem_euclid(12) as PitchClass,
            ..*self
        }
    }
}

impl fmt::Display for Chord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            pitch_class_name(self.root),
            self.chord_type.primary_alias()
        )?;
        if self.bass != 0 {
            write!(f, "/{}", pitch_class_name(self.bass_pitch_class()))?;
        }
        Ok(())
    }
}

fn tone(root: PitchClass, interval: i32) -> PitchClass {
    (root as i32 + interval * 7).rem_euclid(12) as PitchClass
}

impl Vocabulary {
    /// Parse a chord token against this vocabulary.
    pub fn parse_chord(&self, token: &str) -> Option<Chord<'_>> {
        let (body, bass_spelling) = match token.split_once('/') {
            Some((body, bass)) => (body, Some(bass)),
            None => (token, None),
        };

        let (root, suffix) = self.match_root(body)?;
        let chord_type = self.chord_type_for_suffix(suffix)?;

        let bass = bass_spelling
            .and_then(|spelling| self.pitch_class(spelling))
            .map(|bass_pc| ((bass_pc as i32 - root as i32) * 7).rem_euclid(12))
            .unwrap_or(0);

        Some(Chord {
            root,
            chord_type,
            bass,
        })
    }
}

/// Parse a chord token with the built-in vocabulary.
pub fn parse_chord(token: &str) -> Option<Chord<'static>> {
    Vocabulary::builtin().parse_chord(token)
}
