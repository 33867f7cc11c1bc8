//! # Key Detection
//!
//! Estimates the major key of an unlabelled chord sequence with a
//! Krumhansl-Schmuckler style template match, and parses key strings from
//! document metadata.
//!
//! ## Detection Algorithm
//! 1. Build a 12-bucket pitch-class histogram. Every chord tone adds the
//!    chord's weight (major triads 0.5, diminished triads 0.1, anything else
//!    1.0) and the root adds twice that weight on top.
//! 2. Correlate the histogram against [`MAJOR_KEY_PROFILE`] at each of the 12
//!    rotations. The first rotation with the highest score wins.
//! 3. The profile's tonic sits at index 4, which is also where "C" sits in
//!    the internal numbering, so the winning rotation plus 4 is the key.
//!
//! ## Example
//! ```rust
//! use tonnetz::{detect_key, parse_chord};
//!
//! let chords: Vec<_> = ["G", "C", "D", "Em"].iter().filter_map(|t| parse_chord(t)).collect();
//! assert_eq!(detect_key(&chords), Some(5)); // G major
//! assert_eq!(detect_key(&[]), None);
//! ```

use crate::chord::Chord;
use crate::vocabulary::{pitch_class_name, PitchClass, Vocabulary, REFERENCE_KEY};
use tracing::debug;

/// Major-key profile over the internal numbering, tonic at index 4.
///
/// Non-zero entries are the seven diatonic degrees (F C G D A E B relative
/// to the tonic C); tonic and relative-minor tonic weigh the most.
pub const MAJOR_KEY_PROFILE: [f64; 12] = [0.0, 0.0, 0.0, 1.0, 1.8, 1.3, 1.0, 1.8, 1.0, 0.5, 0.0, 0.0];

const MAJOR_WEIGHT: f64 = 0.5;
const DIMINISHED_WEIGHT: f64 = 0.1;
const OTHER_WEIGHT: f64 = 1.0;
const ROOT_BONUS: f64 = 2.0;

/// Minor keys are stored as their relative major, three positions down.
const RELATIVE_MAJOR_SHIFT: i32 = 3;

/// Accumulate weighted chord tones into a pitch-class histogram.
pub fn note_weights(chords: &[Chord<'_>]) -> [f64; 12] {
    let mut weights = [0.0_f64; 12];
    for chord in chords {
        let weight = if chord.chord_type.is_major() {
            MAJOR_WEIGHT
        } else if chord.chord_type.is_diminished() {
            DIMINISHED_WEIGHT
        } else {
            OTHER_WEIGHT
        };
        for pc in chord.pitch_classes() {
            weights[pc as usize] += weight;
        }
        weights[chord.root as usize % 12] += ROOT_BONUS * weight;
    }
    weights
}

/// Score of each of the 12 profile rotations against a histogram.
pub fn key_scores(weights: &[f64; 12]) -> [f64; 12] {
    let mut scores = [0.0_f64; 12];
    for (offset, score) in scores.iter_mut().enumerate() {
        *score = MAJOR_KEY_PROFILE
            .iter()
            .enumerate()
            .map(|(i, profile)| weights[(i + offset) % 12] * profile)
            .sum();
    }
    scores
}

/// Most likely major key of a chord collection, `None` when it is empty.
pub fn detect_key(chords: &[Chord<'_>]) -> Option<PitchClass> {
    if chords.is_empty() {
        return None;
    }

    let scores = key_scores(&note_weights(chords));
    for (offset, score) in scores.iter().enumerate() {
        debug!(key = (offset + REFERENCE_KEY as usize) % 12, score, "key score");
    }

    let key = ((best_offset(&scores) + REFERENCE_KEY as usize) % 12) as PitchClass;
    debug!(key, chords = chords.len(), "detected key");
    Some(key)
}

/// Highest-scoring rotation; the lowest rotation wins a tie.
fn best_offset(scores: &[f64; 12]) -> usize {
    let mut best_offset = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (offset, &score) in scores.iter().enumerate() {
        if score > best_score {
            best_score = score;
            best_offset = offset;
        }
    }
    best_offset
}

/// [`detect_key`] with the reference key as fallback for empty input.
pub fn detect_key_or_default(chords: &[Chord<'_>]) -> PitchClass {
    detect_key(chords).unwrap_or(REFERENCE_KEY)
}

impl Vocabulary {
    /// Parse a metadata key value.
    ///
    /// Accepts a plain integer 0-11, or a note spelling with an optional
    /// `m`/`min`/`minor`/`maj`/`major` modifier (case-insensitive). Minor
    /// keys resolve to their relative major.
    pub fn parse_key(&self, s: &str) -> Option<PitchClass> {
        let key = s.trim();
        if key.is_empty() {
            return None;
        }

        if key.chars().all(|c| c.is_ascii_digit()) {
            return key.parse::<u8>().ok().filter(|n| *n <= 11);
        }

        let (note, minor) = split_key_modifier(key);
        let pc = self.pitch_class(&capitalize(note.trim_end()))?;
        if minor {
            Some((pc as i32 - RELATIVE_MAJOR_SHIFT).rem_euclid(12) as PitchClass)
        } else {
            Some(pc)
        }
    }
}

/// Split a trailing mode modifier off a key string.
fn split_key_modifier(key: &str) -> (&str, bool) {
    const MODIFIERS: [(&str, bool); 5] = [
        ("major", false),
        ("minor", true),
        ("maj", false),
        ("min", true),
        ("m", true),
    ];
    let lower = key.to_ascii_lowercase();
    for (modifier, minor) in MODIFIERS {
        if lower.ends_with(modifier) && lower.len() > modifier.len() {
            return (&key[..key.len() - modifier.len()], minor);
        }
    }
    (key, false)
}

fn capitalize(note: &str) -> String {
    let mut chars = note.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Display name of a key number, e.g. `key_name(5) == "G"`.
pub fn key_name(key: PitchClass) -> &'static str {
    pitch_class_name(key)
}

/// Parse a metadata key value with the built-in vocabulary.
pub fn parse_key(s: &str) -> Option<PitchClass> {
    Vocabulary::builtin().parse_key(s)
}
