//! # Chord Vocabulary
//!
//! Static lookup tables used by the chord parser: note spellings mapped to
//! pitch classes, and the ordered list of chord types.
//!
//! ## Pitch-Class Numbering
//! Pitch classes are integers 0-11 in an internal numbering that walks the
//! circle of fifths rather than the chromatic scale:
//!
//! ```text
//! Ab Eb Bb F  C  G  D  A  E  B  Gb Db
//! 0  1  2  3  4  5  6  7  8  9  10 11
//! ```
//!
//! Every component (parser, key detection, canonicalization, lattice layout)
//! does its arithmetic modulo 12 in this numbering. Multiplying a distance
//! by 7 converts between semitone steps and positions in this numbering.
//!
//! ## Loading
//! The built-in table lives in `chords.yaml` next to this file and is parsed
//! exactly once, on first use of [`Vocabulary::builtin`]. Custom tables can be
//! loaded with [`Vocabulary::from_yaml`]; they are checked for the same
//! invariants as the built-in one.

use crate::error::TonnetzError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Pitch class in the internal circle-of-fifths numbering (0-11).
pub type PitchClass = u8;

/// The reference key all documents are canonicalized to ("C").
pub const REFERENCE_KEY: PitchClass = 4;

const BUILTIN_TABLE: &str = include_str!("chords.yaml");

static BUILTIN: OnceLock<Vocabulary> = OnceLock::new();

/// Canonical display spelling for each pitch class.
const PITCH_CLASS_NAMES: [&str; 12] = [
    "Ab", "Eb", "Bb", "F", "C", "G", "D", "A", "E", "B", "Gb", "Db",
];

/// A lattice coordinate as written in the chord table: `[row, col]`.
pub type TableCoord = [i32; 2];

/// Intervals are pitch-class steps, so one octave either way is enough.
const INTERVAL_RANGE: std::ops::RangeInclusive<i32> = -11..=11;
/// Explicit lattice coordinates stay within a few octaves of the root.
const COORD_RANGE: std::ops::RangeInclusive<i32> = -12..=12;

/// A chord type: name, suffix aliases and interval structure.
///
/// Chord tones lie at `(root + 7 * interval) mod 12`. The first alias is the
/// primary spelling used when a chord is printed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChordType {
    pub name: String,
    pub aliases: Vec<String>,
    pub intervals: Vec<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Vec<TableCoord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bass_coord: Option<TableCoord>,
}

impl ChordType {
    /// Suffix used when printing a chord of this type.
    pub fn primary_alias(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or("")
    }

    /// True when the first three intervals spell a major triad.
    pub fn is_major(&self) -> bool {
        self.intervals.starts_with(&[0, 4, 7])
    }

    /// True when the first three intervals spell a diminished triad.
    pub fn is_diminished(&self) -> bool {
        self.intervals.starts_with(&[0, 3, 6])
    }
}

#[derive(Debug, Deserialize)]
struct RawNote {
    name: String,
    pitch_class: u8,
}

/// Raw table for YAML deserialization
#[derive(Debug, Deserialize)]
struct RawTable {
    notes: Vec<RawNote>,
    chords: Vec<ChordType>,
}

/// Frozen note-spelling and chord-type tables.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Spellings sorted longest first, so "C#" is tried before "C".
    spellings: Vec<(String, PitchClass)>,
    pitch_classes: HashMap<String, PitchClass>,
    chord_types: Vec<ChordType>,
    /// Alias to index into `chord_types`.
    suffixes: HashMap<String, usize>,
    names: HashMap<String, usize>,
}

impl Vocabulary {
    /// The built-in vocabulary, parsed from `chords.yaml` on first use.
    pub fn builtin() -> &'static Vocabulary {
        BUILTIN.get_or_init(|| {
            Vocabulary::from_yaml(BUILTIN_TABLE)
                .unwrap_or_else(|e| panic!("built-in chord table is malformed: {}", e))
        })
    }

    /// Parse and validate a chord table.
    pub fn from_yaml(source: &str) -> Result<Self, TonnetzError> {
        let raw: RawTable =
            serde_yaml::from_str(source).map_err(|e| TonnetzError::Vocabulary(e.to_string()))?;

        let mut spellings = Vec::with_capacity(raw.notes.len());
        for note in raw.notes {
            if note.pitch_class > 11 {
                return Err(TonnetzError::Vocabulary(format!(
                    "note '{}' has pitch class {}, expected 0-11",
                    note.name, note.pitch_class
                )));
            }
            if note.name.is_empty() {
                return Err(TonnetzError::Vocabulary("empty note spelling".to_string()));
            }
            spellings.push((note.name, note.pitch_class));
        }
        // Stable: equal-length spellings keep table order.
        spellings.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut names = HashMap::new();
        let mut suffixes = HashMap::new();
        for (index, chord_type) in raw.chords.iter().enumerate() {
            if chord_type.intervals.is_empty() {
                return Err(TonnetzError::Vocabulary(format!(
                    "chord type '{}' has no intervals",
                    chord_type.name
                )));
            }
            if chord_type.aliases.is_empty() {
                return Err(TonnetzError::Vocabulary(format!(
                    "chord type '{}' has no aliases",
                    chord_type.name
                )));
            }
            if let Some(interval) = chord_type
                .intervals
                .iter()
                .find(|&&i| !INTERVAL_RANGE.contains(&i))
            {
                return Err(TonnetzError::Vocabulary(format!(
                    "chord type '{}' has interval {}, expected -11 to 11",
                    chord_type.name, interval
                )));
            }
            let coords = chord_type.coords.iter().flatten().chain(&chord_type.bass_coord);
            if coords.flatten().any(|v| !COORD_RANGE.contains(v)) {
                return Err(TonnetzError::Vocabulary(format!(
                    "chord type '{}' has a coordinate outside -12 to 12",
                    chord_type.name
                )));
            }
            if let Some(coords) = &chord_type.coords {
                if coords.len() != chord_type.intervals.len() {
                    return Err(TonnetzError::Vocabulary(format!(
                        "chord type '{}' has {} coords for {} intervals",
                        chord_type.name,
                        coords.len(),
                        chord_type.intervals.len()
                    )));
                }
            }
            if names.insert(chord_type.name.clone(), index).is_some() {
                return Err(TonnetzError::Vocabulary(format!(
                    "duplicate chord type '{}'",
                    chord_type.name
                )));
            }
            for alias in &chord_type.aliases {
                if suffixes.insert(alias.clone(), index).is_some() {
                    return Err(TonnetzError::Vocabulary(format!(
                        "alias '{}' of '{}' is already used by another chord type",
                        alias, chord_type.name
                    )));
                }
            }
        }

        // A repeated spelling resolves to its first entry, as `match_root` does.
        let mut pitch_classes = HashMap::with_capacity(spellings.len());
        for (name, pc) in &spellings {
            pitch_classes.entry(name.clone()).or_insert(*pc);
        }

        Ok(Self {
            spellings,
            pitch_classes,
            chord_types: raw.chords,
            suffixes,
            names,
        })
    }

    /// Exact lookup of a note spelling.
    pub fn pitch_class(&self, spelling: &str) -> Option<PitchClass> {
        self.pitch_classes.get(spelling).copied()
    }

    /// Longest spelling that prefixes `s`, with the rest of the string.
    pub fn match_root<'s>(&self, s: &'s str) -> Option<(PitchClass, &'s str)> {
        self.spellings
            .iter()
            .find_map(|(name, pc)| s.strip_prefix(name.as_str()).map(|rest| (*pc, rest)))
    }

    /// Chord type that has `suffix` as an alias (aliases are unique).
    pub fn chord_type_for_suffix(&self, suffix: &str) -> Option<&ChordType> {
        self.suffixes.get(suffix).map(|&i| &self.chord_types[i])
    }

    pub fn chord_type(&self, name: &str) -> Option<&ChordType> {
        self.names.get(name).map(|&i| &self.chord_types[i])
    }

    pub fn chord_types(&self) -> &[ChordType] {
        &self.chord_types
    }
}

/// Display spelling for a pitch class (taken modulo 12).
pub fn pitch_class_name(pc: PitchClass) -> &'static str {
    PITCH_CLASS_NAMES[(pc % 12) as usize]
}
